//! Entities managed by the cafe admin
//!
//! Field names follow the backend's camelCase JSON. Every entity comes with
//! create/update payloads and the filter struct its list view uses.

pub mod catalog;
pub mod people;
pub mod sales;

pub use catalog::{Category, Discount, DiscountKind, Menu, Product};
pub use people::{Customer, Role, User};
pub use sales::{DiningTable, Order, OrderItem, OrderStatus, PaymentMethod, TableStatus, Transaction};

/// Primary key type used by every collection
pub type EntityId = u64;

/// Error returned when an enum value cannot be parsed from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected one of: {expected}")]
pub struct ParseEnumError {
    pub expected: &'static str,
}

/// Declare an enum that travels as SCREAMING_SNAKE_CASE strings and parses
/// case-insensitively from text
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $( $variant:ident => $wire:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $( #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::models::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().replace(['-', ' '], "_").to_ascii_uppercase();
                match normalized.as_str() {
                    $( $wire => Ok($name::$variant), )+
                    _ => Err($crate::models::ParseEnumError {
                        expected: concat!($( $wire, " " ),+).trim_end(),
                    }),
                }
            }
        }
    };
}

pub(crate) use wire_enum;
