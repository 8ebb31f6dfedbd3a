/// Order model
///
/// An order is an immutable snapshot taken at payment confirmation: each line
/// copies the product's name, price, and image at the time of purchase, so
/// later catalog edits never alter past orders. Orders in this system are
/// only created once the gateway reports a succeeded payment, so they are
/// born paid.
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one purchased cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product id at time of purchase
    pub product: ObjectId,

    /// Product name at time of purchase
    pub name: String,

    /// Purchased quantity
    pub qty: u32,

    /// Unit price in dollars at time of purchase
    pub price: f64,

    /// Image URL at time of purchase
    pub image: String,
}

/// Order document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Purchasing user id
    pub user: ObjectId,

    /// Snapshotted lines
    pub order_items: Vec<OrderItem>,

    /// Total in dollars at time of purchase
    pub total_price: f64,

    /// Payment method label (always "stripe" in this system)
    pub payment_method: String,

    /// Whether the order has been paid
    pub is_paid: bool,

    /// When payment was confirmed
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub paid_at: DateTime<Utc>,

    /// When the order was created
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Input for materializing an order at payment confirmation
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user: ObjectId,
    pub order_items: Vec<OrderItem>,
    pub total_price: f64,
    pub payment_method: String,
}

impl Order {
    /// Builds a paid order with a fresh id and the current time as the paid
    /// timestamp
    pub fn new(data: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            user: data.user,
            order_items: data.order_items,
            total_price: data.total_price,
            payment_method: data.payment_method,
            is_paid: true,
            paid_at: now,
            created_at: now,
        }
    }
}
