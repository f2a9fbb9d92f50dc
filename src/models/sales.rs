use crate::api::Resource;
use crate::models::{wire_enum, EntityId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum TableStatus {
        Available => "AVAILABLE",
        Occupied => "OCCUPIED",
        Reserved => "RESERVED",
    }
}

/// A seat group in the cafe. Served from `/tables`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: EntityId,
    pub number: String,
    #[serde(default)]
    pub capacity: u32,
    pub status: TableStatus,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiningTable {
    pub number: String,
    pub capacity: u32,
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiningTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TableStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

crate::table_filters! {
    pub struct DiningTableFilters {
        text search: String,
        value status: TableStatus,
    }
}

impl Resource for DiningTable {
    const PATH: &'static str = "tables";
    const LABEL: &'static str = "Tables";
    const COLUMNS: &'static [&'static str] = &["id", "number", "capacity", "status", "location"];

    type Filters = DiningTableFilters;
    type Create = CreateDiningTable;
    type Update = UpdateDiningTable;

    fn id(&self) -> EntityId {
        self.id
    }
}

wire_enum! {
    pub enum OrderStatus {
        Pending => "PENDING",
        Preparing => "PREPARING",
        Served => "SERVED",
        Paid => "PAID",
        Cancelled => "CANCELLED",
    }
}

impl OrderStatus {
    /// Orders in these states can no longer change
    pub fn is_closed(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub menu_id: EntityId,
    pub quantity: u32,
    /// Unit price at the time of ordering
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: EntityId,
    pub order_number: String,
    #[serde(default)]
    pub table_id: Option<EntityId>,
    #[serde(default)]
    pub customer_id: Option<EntityId>,
    #[serde(default)]
    pub user_id: Option<EntityId>,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub discount_id: Option<EntityId>,
    #[serde(default)]
    pub discount_amount: f64,
    pub total: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<EntityId>,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<EntityId>,
}

crate::table_filters! {
    pub struct OrderFilters {
        text search: String,
        value status: OrderStatus,
        value table_id: EntityId,
        value customer_id: EntityId,
        value date: NaiveDate,
    }
}

impl Resource for Order {
    const PATH: &'static str = "orders";
    const LABEL: &'static str = "Orders";
    const COLUMNS: &'static [&'static str] =
        &["id", "orderNumber", "tableId", "status", "total", "createdAt"];

    type Filters = OrderFilters;
    type Create = CreateOrder;
    type Update = UpdateOrder;

    fn id(&self) -> EntityId {
        self.id
    }
}

wire_enum! {
    pub enum PaymentMethod {
        Cash => "CASH",
        Card => "CARD",
        EWallet => "E_WALLET",
        BankTransfer => "BANK_TRANSFER",
    }
}

/// Payment recorded against an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: EntityId,
    pub order_id: EntityId,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub order_id: EntityId,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

crate::table_filters! {
    pub struct TransactionFilters {
        text search: String,
        value payment_method: PaymentMethod,
        value order_id: EntityId,
        value date: NaiveDate,
    }
}

impl Resource for Transaction {
    const PATH: &'static str = "transactions";
    const LABEL: &'static str = "Transactions";
    const COLUMNS: &'static [&'static str] =
        &["id", "orderId", "amount", "paymentMethod", "paidAt"];

    type Filters = TransactionFilters;
    type Create = CreateTransaction;
    type Update = UpdateTransaction;

    fn id(&self) -> EntityId {
        self.id
    }
}
