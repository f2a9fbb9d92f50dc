use crate::api::Resource;
use crate::models::{wire_enum, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

crate::table_filters! {
    pub struct CategoryFilters {
        text search: String,
    }
}

impl Resource for Category {
    const PATH: &'static str = "categories";
    const LABEL: &'static str = "Categories";
    const COLUMNS: &'static [&'static str] = &["id", "name", "description"];

    type Filters = CategoryFilters;
    type Create = CreateCategory;
    type Update = UpdateCategory;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Item sold to customers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category_id: EntityId,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenu {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category_id: EntityId,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenu {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

crate::table_filters! {
    pub struct MenuFilters {
        text search: String,
        value category_id: EntityId,
        value is_available: bool,
    }
}

impl Resource for Menu {
    const PATH: &'static str = "menus";
    const LABEL: &'static str = "Menus";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "price", "categoryId", "isAvailable"];

    type Filters = MenuFilters;
    type Create = CreateMenu;
    type Update = UpdateMenu;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Stock item used to prepare menus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub stock: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub min_stock: Option<f64>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.min_stock.is_some_and(|min| self.stock <= min)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub stock: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<f64>,
}

crate::table_filters! {
    pub struct ProductFilters {
        text search: String,
        value low_stock: bool,
    }
}

impl Resource for Product {
    const PATH: &'static str = "products";
    const LABEL: &'static str = "Products";
    const COLUMNS: &'static [&'static str] = &["id", "name", "sku", "stock", "unit"];

    type Filters = ProductFilters;
    type Create = CreateProduct;
    type Update = UpdateProduct;

    fn id(&self) -> EntityId {
        self.id
    }
}

wire_enum! {
    /// How a discount's `value` is applied
    pub enum DiscountKind {
        Percentage => "PERCENTAGE",
        Fixed => "FIXED",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: EntityId,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: f64,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
}

impl Discount {
    /// Amount taken off `subtotal`, never more than the subtotal itself
    pub fn amount_off(&self, subtotal: f64) -> f64 {
        let amount = match self.kind {
            DiscountKind::Percentage => subtotal * self.value / 100.0,
            DiscountKind::Fixed => self.value,
        };
        amount.clamp(0.0, subtotal.max(0.0))
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at.map_or(true, |start| start <= at)
            && self.ends_at.map_or(true, |end| at <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscount {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiscount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DiscountKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

crate::table_filters! {
    pub struct DiscountFilters {
        text search: String,
        value kind: DiscountKind,
        value is_active: bool,
    }
}

impl Resource for Discount {
    const PATH: &'static str = "discounts";
    const LABEL: &'static str = "Discounts";
    const COLUMNS: &'static [&'static str] = &["id", "code", "name", "type", "value", "isActive"];

    type Filters = DiscountFilters;
    type Create = CreateDiscount;
    type Update = UpdateDiscount;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TableFilters;

    fn discount(kind: DiscountKind, value: f64) -> Discount {
        Discount {
            id: 1,
            code: "HAPPY".into(),
            name: "Happy hour".into(),
            kind,
            value,
            starts_at: None,
            ends_at: None,
            is_active: true,
        }
    }

    #[test]
    fn test_discount_amount_is_capped() {
        assert_eq!(discount(DiscountKind::Percentage, 10.0).amount_off(50.0), 5.0);
        assert_eq!(discount(DiscountKind::Fixed, 80.0).amount_off(50.0), 50.0);
    }

    #[test]
    fn test_discount_validity_window() {
        let mut d = discount(DiscountKind::Fixed, 1.0);
        let now = Utc::now();
        d.ends_at = Some(now - chrono::Duration::hours(1));
        assert!(!d.is_valid_at(now));
        d.ends_at = None;
        assert!(d.is_valid_at(now));
    }

    #[test]
    fn test_discount_kind_wire_form() {
        let json = r#"{"id":3,"code":"TEN","name":"Ten off","type":"FIXED","value":10}"#;
        let d: Discount = serde_json::from_str(json).unwrap();
        assert_eq!(d.kind, DiscountKind::Fixed);
        assert_eq!("percentage".parse::<DiscountKind>(), Ok(DiscountKind::Percentage));
        assert!("half".parse::<DiscountKind>().is_err());
    }

    #[test]
    fn test_menu_filters_query_names() {
        let filters = MenuFilters::from_pairs(["category_id=4", "is_available=true"]).unwrap();
        assert_eq!(filters.fingerprint(), r#"{"categoryId":4,"isAvailable":true}"#);
    }

    #[test]
    fn test_low_stock() {
        let product = Product {
            id: 1,
            name: "Milk".into(),
            sku: None,
            stock: 2.0,
            unit: Some("l".into()),
            min_stock: Some(5.0),
        };
        assert!(product.is_low_stock());
    }
}
