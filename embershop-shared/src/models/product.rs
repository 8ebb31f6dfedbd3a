/// Catalog product model
///
/// Products are created, updated, and deleted by admin users only; reads are
/// public. Prices are dollar amounts. When no image URL is supplied at
/// creation, a placeholder derived from the product name is used.
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog product document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Product name
    pub name: String,

    /// Long-form description
    pub description: String,

    /// Unit price in dollars
    pub price: f64,

    /// Brand name
    pub brand: String,

    /// Category label
    pub category: String,

    /// Units currently in stock
    pub count_in_stock: i32,

    /// Image URL
    pub image: String,

    /// When the product was created
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub brand: String,
    pub category: String,
    pub count_in_stock: i32,
    /// Omitted image falls back to a name-derived placeholder
    pub image: Option<String>,
}

/// Field-wise product update; only `Some` fields are applied
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub count_in_stock: Option<i32>,
    pub image: Option<String>,
}

impl Product {
    /// Builds a new product document with a fresh id and timestamps
    pub fn new(data: NewProduct) -> Self {
        let image = data
            .image
            .unwrap_or_else(|| placeholder_image(&data.name));
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name: data.name,
            description: data.description,
            price: data.price,
            brand: data.brand,
            category: data.category,
            count_in_stock: data.count_in_stock,
            image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a field-wise update in place, bumping `updated_at`
    pub fn apply(&mut self, update: ProductUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(count_in_stock) = update.count_in_stock {
            self.count_in_stock = count_in_stock;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        self.updated_at = Utc::now();
    }
}

/// Placeholder image URL for products created without one
fn placeholder_image(name: &str) -> String {
    format!(
        "https://via.placeholder.com/300x300?text={}",
        urlencoding::encode(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewProduct {
        NewProduct {
            name: "Sony WH-1000XM5".to_string(),
            description: "Noise-cancelling headphones".to_string(),
            price: 349.99,
            brand: "Sony".to_string(),
            category: "Electronics".to_string(),
            count_in_stock: 12,
            image: None,
        }
    }

    #[test]
    fn test_placeholder_image_when_omitted() {
        let product = Product::new(sample());
        assert!(product
            .image
            .starts_with("https://via.placeholder.com/300x300?text=Sony"));
    }

    #[test]
    fn test_explicit_image_is_kept() {
        let product = Product::new(NewProduct {
            image: Some("https://cdn.example.com/xm5.png".to_string()),
            ..sample()
        });
        assert_eq!(product.image, "https://cdn.example.com/xm5.png");
    }

    #[test]
    fn test_apply_merges_only_provided_fields() {
        let mut product = Product::new(sample());

        product.apply(ProductUpdate {
            price: Some(299.99),
            count_in_stock: Some(0),
            ..Default::default()
        });

        assert_eq!(product.price, 299.99);
        assert_eq!(product.count_in_stock, 0);
        assert_eq!(product.name, "Sony WH-1000XM5");
        assert_eq!(product.brand, "Sony");
    }
}
