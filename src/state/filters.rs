//! Per-table filter types
//!
//! Each list view declares its own filter struct so the fields it can filter
//! on are checked at compile time. Filter values are never stored empty: a
//! blank text value clears the field instead of being kept around.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Behaviour shared by every table filter type
pub trait TableFilters:
    Clone + Debug + Default + PartialEq + Serialize + Send + Sync + 'static
{
    /// Merge a partial update into these filters.
    ///
    /// Fields present in `patch` overwrite the current ones, blank text
    /// clears the field, and fields absent from `patch` are kept.
    fn merge(&mut self, patch: Self);

    /// Drop every empty value
    fn normalized(self) -> Self;

    /// Stable serialized form, used to tell fetch requests apart
    fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.clone().normalized() == Self::default()
    }

    /// Set one filter from its text form, `name` being the snake_case field name
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), FilterError>;

    /// Names accepted by `set_field`
    fn field_names() -> &'static [&'static str];

    /// Build filters from `name=value` pairs, as typed on a command line
    fn from_pairs<I, S>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Self::default();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| FilterError::MalformedPair(pair.to_string()))?;
            filters.set_field(name.trim(), value)?;
        }
        Ok(filters)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown filter '{field}' (expected one of: {allowed})")]
    UnknownField { field: String, allowed: String },
    #[error("invalid value '{value}' for filter '{field}': {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    #[error("expected name=value, got '{0}'")]
    MalformedPair(String),
}

impl FilterError {
    pub fn unknown(field: &str, allowed: &[&str]) -> Self {
        FilterError::UnknownField {
            field: field.to_string(),
            allowed: if allowed.is_empty() {
                "none".to_string()
            } else {
                allowed.join(", ")
            },
        }
    }
}

/// Normalize a text value: blank strings become `None`
pub fn clean_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Apply a text patch. `Some("")` clears, `None` keeps the current value.
pub fn merge_text(slot: &mut Option<String>, patch: Option<String>) {
    if let Some(value) = patch {
        *slot = clean_text(Some(value));
    }
}

/// Apply a non-text patch. `None` keeps the current value.
pub fn merge_value<V>(slot: &mut Option<V>, patch: Option<V>) {
    if patch.is_some() {
        *slot = patch;
    }
}

/// Declare a filter struct whose fields are all optional.
///
/// `text` fields are strings that get cleared when blank, `value` fields are
/// anything else (ids, flags, enums).
#[macro_export]
macro_rules! table_filters {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$field_meta:meta])* $kind:ident $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl $crate::state::TableFilters for $name {
            fn merge(&mut self, patch: Self) {
                $( $crate::table_filters!(@merge $kind, self.$field, patch.$field); )*
            }

            fn normalized(self) -> Self {
                Self {
                    $( $field: $crate::table_filters!(@clean $kind, self.$field), )*
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: &str,
            ) -> Result<(), $crate::state::filters::FilterError> {
                match name {
                    $(
                        stringify!($field) => {
                            let parsed = value.trim().parse::<$ty>().map_err(|e| {
                                $crate::state::filters::FilterError::InvalidValue {
                                    field: name.to_string(),
                                    value: value.to_string(),
                                    reason: e.to_string(),
                                }
                            })?;
                            let mut patch = Self::default();
                            patch.$field = Some(parsed);
                            self.merge(patch);
                            Ok(())
                        }
                    )*
                    _ => Err($crate::state::filters::FilterError::unknown(
                        name,
                        Self::field_names(),
                    )),
                }
            }

            fn field_names() -> &'static [&'static str] {
                &[$( stringify!($field) ),*]
            }
        }
    };
    (@merge text, $slot:expr, $patch:expr) => {
        $crate::state::filters::merge_text(&mut $slot, $patch)
    };
    (@merge value, $slot:expr, $patch:expr) => {
        $crate::state::filters::merge_value(&mut $slot, $patch)
    };
    (@clean text, $value:expr) => {
        $crate::state::filters::clean_text($value)
    };
    (@clean value, $value:expr) => {
        $value
    };
}

/// Filters for tables that cannot be filtered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoFilters {}

impl TableFilters for NoFilters {
    fn merge(&mut self, _patch: Self) {}

    fn normalized(self) -> Self {
        self
    }

    fn set_field(&mut self, name: &str, _value: &str) -> Result<(), FilterError> {
        Err(FilterError::unknown(name, Self::field_names()))
    }

    fn field_names() -> &'static [&'static str] {
        &[]
    }
}

/// A single dynamic filter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Flag(bool),
}

impl FilterValue {
    fn is_empty(&self) -> bool {
        matches!(self, FilterValue::Text(text) if text.trim().is_empty())
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Flag(value)
    }
}

/// Free-form filters keyed by name, for tables without a dedicated type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterMap(BTreeMap<String, FilterValue>);

impl FilterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; blank text is ignored
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.0.insert(name.into(), value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }
}

impl TableFilters for FilterMap {
    fn merge(&mut self, patch: Self) {
        for (name, value) in patch.0 {
            if value.is_empty() {
                self.0.remove(&name);
            } else {
                self.0.insert(name, value);
            }
        }
    }

    fn normalized(mut self) -> Self {
        self.0.retain(|_, value| !value.is_empty());
        self
    }

    /// Any name is accepted; `true`/`false` become flags
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), FilterError> {
        let value = match value.trim() {
            "true" => FilterValue::Flag(true),
            "false" => FilterValue::Flag(false),
            other => FilterValue::Text(other.to_string()),
        };
        self.merge(FilterMap(BTreeMap::from([(name.to_string(), value)])));
        Ok(())
    }

    fn field_names() -> &'static [&'static str] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::table_filters! {
        /// Filters used only by these tests
        pub struct SampleFilters {
            text search: String,
            value active: bool,
        }
    }

    #[test]
    fn test_merge_overwrites_and_keeps() {
        let mut filters = SampleFilters {
            search: Some("latte".into()),
            active: Some(true),
        };
        filters.merge(SampleFilters {
            search: None,
            active: Some(false),
        });
        assert_eq!(filters.search.as_deref(), Some("latte"));
        assert_eq!(filters.active, Some(false));
    }

    #[test]
    fn test_blank_text_clears_field() {
        let mut filters = SampleFilters {
            search: Some("latte".into()),
            active: None,
        };
        filters.merge(SampleFilters {
            search: Some("  ".into()),
            active: None,
        });
        assert_eq!(filters.search, None);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_normalized_strips_empty_text() {
        let filters = SampleFilters {
            search: Some(String::new()),
            active: Some(true),
        }
        .normalized();
        assert_eq!(filters.search, None);
        assert_eq!(filters.active, Some(true));
    }

    #[test]
    fn test_fingerprint_skips_unset_fields() {
        let filters = SampleFilters {
            search: Some("admin".into()),
            active: None,
        };
        assert_eq!(filters.fingerprint(), r#"{"search":"admin"}"#);
        assert_eq!(SampleFilters::default().fingerprint(), "{}");
    }

    #[test]
    fn test_filter_map_merge_removes_blank() {
        let mut filters = FilterMap::new().with("search", "admin").with("active", true);
        filters.merge(FilterMap(BTreeMap::from([(
            "search".to_string(),
            FilterValue::Text(String::new()),
        )])));

        assert_eq!(filters.get("search"), None);
        assert_eq!(filters.get("active"), Some(&FilterValue::Flag(true)));
    }

    #[test]
    fn test_typed_from_pairs() {
        let filters = SampleFilters::from_pairs(["search=flat white", "active=false"]).unwrap();
        assert_eq!(filters.search.as_deref(), Some("flat white"));
        assert_eq!(filters.active, Some(false));

        assert_eq!(
            SampleFilters::from_pairs(["colour=red"]),
            Err(FilterError::UnknownField {
                field: "colour".into(),
                allowed: "search, active".into(),
            })
        );
        assert!(matches!(
            SampleFilters::from_pairs(["active=maybe"]),
            Err(FilterError::InvalidValue { .. })
        ));
        assert_eq!(
            SampleFilters::from_pairs(["active"]),
            Err(FilterError::MalformedPair("active".into()))
        );
    }

    #[test]
    fn test_filter_map_from_pairs() {
        let filters = FilterMap::from_pairs(["status=paid", "active=true", "empty="]).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters.get("status"), Some(&FilterValue::Text("paid".into())));
        assert_eq!(filters.get("active"), Some(&FilterValue::Flag(true)));
        assert_eq!(filters.fingerprint(), r#"{"active":true,"status":"paid"}"#);
    }
}
