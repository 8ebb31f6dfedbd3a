/// Cart model
///
/// Each user owns at most one cart (unique index on `carts.user`). A cart is
/// an ordered list of lines, each referencing a product id with a quantity of
/// at least 1. Lines whose product no longer resolves are orphans; they are
/// pruned when the cart is read.
///
/// # Invariants
///
/// - at most one cart per user
/// - `quantity >= 1` for every retained line; a zero quantity removes the line
/// - a cart with zero lines is still a valid cart document
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A (product reference, quantity) pair within a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Referenced product id
    pub product: ObjectId,

    /// Units of the product, always >= 1
    pub quantity: u32,
}

/// Cart document, owned one-to-one by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Unique cart id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Owning user id
    pub user: ObjectId,

    /// Ordered cart lines
    pub items: Vec<CartItem>,

    /// When the cart was created
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    /// When the cart was last updated
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Builds an empty cart for a user
    pub fn new(user: ObjectId) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            user,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the position of the line referencing `product`, if any
    pub fn line_index(&self, product: &ObjectId) -> Option<usize> {
        self.items.iter().position(|item| &item.product == product)
    }

    /// Merges `quantity` into the line for `product`, appending a new line
    /// if the product is not in the cart yet
    pub fn merge_line(&mut self, product: ObjectId, quantity: u32) {
        match self.line_index(&product) {
            Some(index) => self.items[index].quantity += quantity,
            None => self.items.push(CartItem { product, quantity }),
        }
    }

    /// Overwrites the quantity of an existing line; a quantity of zero
    /// removes the line. Returns false when the line does not exist.
    pub fn set_line(&mut self, product: &ObjectId, quantity: u32) -> bool {
        match self.line_index(product) {
            Some(index) => {
                if quantity == 0 {
                    self.items.remove(index);
                } else {
                    self.items[index].quantity = quantity;
                }
                true
            }
            None => false,
        }
    }

    /// Removes the line referencing `product`; returns false when absent
    pub fn remove_line(&mut self, product: &ObjectId) -> bool {
        match self.line_index(product) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }
}
