//! Catalog seeder
//!
//! Inserts a handful of sample products so a fresh install has something to
//! browse. Does nothing when the catalog already has products.
//!
//! ```bash
//! cargo run -p embershop-api --bin embershop-seed
//! ```

use embershop_api::config::Config;
use embershop_shared::models::NewProduct;
use embershop_shared::store::{MongoStore, Store};

fn sample_products() -> Vec<NewProduct> {
    let raw: [(&str, &str, f64, &str, &str, i32); 5] = [
        (
            "iPhone 15 Pro",
            "Latest iPhone with advanced features and powerful performance",
            999.99,
            "Apple",
            "Electronics",
            10,
        ),
        (
            "Samsung Galaxy S24",
            "Premium Android smartphone with cutting-edge technology",
            899.99,
            "Samsung",
            "Electronics",
            15,
        ),
        (
            "MacBook Pro M3",
            "Professional laptop with M3 chip for ultimate performance",
            1999.99,
            "Apple",
            "Computers",
            8,
        ),
        (
            "Nike Air Max 270",
            "Comfortable running shoes with excellent cushioning",
            129.99,
            "Nike",
            "Footwear",
            25,
        ),
        (
            "Sony WH-1000XM5",
            "Premium noise-cancelling headphones with exceptional sound quality",
            349.99,
            "Sony",
            "Electronics",
            12,
        ),
    ];

    raw.into_iter()
        .map(
            |(name, description, price, brand, category, count_in_stock)| NewProduct {
                name: name.to_string(),
                description: description.to_string(),
                price,
                brand: brand.to_string(),
                category: category.to_string(),
                count_in_stock,
                image: None,
            },
        )
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let store = MongoStore::connect(&config.database.uri, &config.database.database).await?;
    store.ensure_indexes().await?;

    let existing = store.list_products().await?;
    if !existing.is_empty() {
        tracing::info!(
            count = existing.len(),
            "catalog already has products, nothing to do"
        );
        return Ok(());
    }

    let products = sample_products();
    let total = products.len();
    for product in products {
        let created = store.create_product(product).await?;
        tracing::info!(product_id = %created.id, name = %created.name, "seeded product");
    }

    tracing::info!(count = total, "catalog seeded");
    Ok(())
}
