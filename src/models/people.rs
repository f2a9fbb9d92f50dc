use crate::api::Resource;
use crate::models::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRole {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

crate::table_filters! {
    pub struct RoleFilters {
        text search: String,
    }
}

impl Resource for Role {
    const PATH: &'static str = "roles";
    const LABEL: &'static str = "Roles";
    const COLUMNS: &'static [&'static str] = &["id", "name", "description", "permissions"];

    type Filters = RoleFilters;
    type Create = CreateRole;
    type Update = UpdateRole;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Staff account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role_id: EntityId,
    /// Populated when the backend joins the role in
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: EntityId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

crate::table_filters! {
    pub struct UserFilters {
        text search: String,
        value role_id: EntityId,
        value is_active: bool,
    }
}

impl Resource for User {
    const PATH: &'static str = "users";
    const LABEL: &'static str = "Users";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "roleId", "isActive"];

    type Filters = UserFilters;
    type Create = CreateUser;
    type Update = UpdateUser;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Loyalty points balance
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

crate::table_filters! {
    pub struct CustomerFilters {
        text search: String,
    }
}

impl Resource for Customer {
    const PATH: &'static str = "customers";
    const LABEL: &'static str = "Customers";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "phone", "points"];

    type Filters = CustomerFilters;
    type Create = CreateCustomer;
    type Update = UpdateCustomer;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TableFilters;

    #[test]
    fn test_user_decodes_camel_case() {
        let json = r#"{
            "id": 7,
            "name": "Ana",
            "email": "ana@cafe.test",
            "roleId": 2,
            "role": { "id": 2, "name": "cashier" },
            "createdAt": "2024-03-01T08:30:00Z"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role_id, 2);
        assert!(user.is_active);
        assert_eq!(user.role.map(|r| r.name).as_deref(), Some("cashier"));
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let dto = UpdateUser {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&dto).unwrap(), r#"{"isActive":false}"#);
    }

    #[test]
    fn test_user_filters_from_cli_pairs() {
        let filters = UserFilters::from_pairs(["role_id=3", "search=ana"]).unwrap();
        assert_eq!(filters.role_id, Some(3));
        assert_eq!(filters.fingerprint(), r#"{"search":"ana","roleId":3}"#);
    }
}
