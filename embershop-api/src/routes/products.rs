/// Catalog endpoints
///
/// Reads are public; creating, updating, and deleting products require the
/// admin role.
///
/// # Endpoints
///
/// - `GET /v1/api/products` - List the catalog
/// - `GET /v1/api/products/:id` - Single product
/// - `POST /v1/api/products` - Create product (admin)
/// - `PUT /v1/api/products/:id` - Update product (admin)
/// - `DELETE /v1/api/products/:id` - Delete product (admin)
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use embershop_shared::models::{NewProduct, Product, ProductUpdate};
use embershop_shared::store::Store;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::parse_object_id,
};

/// Product representation on the wire
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub brand: String,
    pub category: String,
    pub count_in_stock: i32,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_hex(),
            name: product.name,
            description: product.description,
            price: product.price,
            brand: product.brand,
            category: product.category,
            count_in_stock: product.count_in_stock,
            image: product.image,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Create product request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 2, message = "Product name must be at least 2 characters long"))]
    pub name: String,

    #[validate(length(
        min = 10,
        message = "Product description must be at least 10 characters long"
    ))]
    pub description: String,

    #[validate(range(min = 0.01, message = "Price must be a positive number"))]
    pub price: f64,

    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,

    #[validate(range(min = 0, message = "Stock quantity must be a non-negative number"))]
    pub count_in_stock: i32,

    /// Omitted image falls back to a name-derived placeholder
    pub image: Option<String>,
}

/// Update product request; only provided fields are applied
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 2, message = "Product name must be at least 2 characters long"))]
    pub name: Option<String>,

    #[validate(length(
        min = 10,
        message = "Product description must be at least 10 characters long"
    ))]
    pub description: Option<String>,

    #[validate(range(min = 0.01, message = "Price must be a positive number"))]
    pub price: Option<f64>,

    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: Option<String>,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: Option<String>,

    #[validate(range(min = 0, message = "Stock quantity must be a non-negative number"))]
    pub count_in_stock: Option<i32>,

    pub image: Option<String>,
}

/// Delete product response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteProductResponse {
    pub message: String,
}

/// List the whole catalog
pub async fn list_products(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = state.store.list_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Fetch a single product
///
/// # Errors
///
/// - `400 Bad Request`: malformed id
/// - `404 Not Found`: no such product
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductResponse>> {
    let id = parse_object_id(&id)?;

    let product = state
        .store
        .find_product(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(product.into()))
}

/// Create a product (admin)
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    req.validate()?;

    let product = state
        .store
        .create_product(NewProduct {
            name: req.name,
            description: req.description,
            price: req.price,
            brand: req.brand,
            category: req.category,
            count_in_stock: req.count_in_stock,
            image: req.image,
        })
        .await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Update a product field-wise (admin)
///
/// # Errors
///
/// - `400 Bad Request`: malformed id or validation failure
/// - `404 Not Found`: no such product
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let id = parse_object_id(&id)?;
    req.validate()?;

    let product = state
        .store
        .update_product(
            id,
            ProductUpdate {
                name: req.name,
                description: req.description,
                price: req.price,
                brand: req.brand,
                category: req.category,
                count_in_stock: req.count_in_stock,
                image: req.image,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    tracing::info!(product_id = %product.id, "product updated");

    Ok(Json(product.into()))
}

/// Delete a product (admin)
///
/// Cart lines referencing the deleted product become orphans and are pruned
/// the next time their cart is read.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteProductResponse>> {
    let id = parse_object_id(&id)?;

    let deleted = state.store.delete_product(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    tracing::info!(product_id = %id, "product deleted");

    Ok(Json(DeleteProductResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_product_validation() {
        let valid = CreateProductRequest {
            name: "Sony WH-1000XM5".to_string(),
            description: "Noise-cancelling headphones".to_string(),
            price: 349.99,
            brand: "Sony".to_string(),
            category: "Electronics".to_string(),
            count_in_stock: 12,
            image: None,
        };
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_create_product_rejects_nonpositive_price() {
        let req = CreateProductRequest {
            name: "Freebie".to_string(),
            description: "Costs nothing at all".to_string(),
            price: 0.0,
            brand: "Acme".to_string(),
            category: "Misc".to_string(),
            count_in_stock: 1,
            image: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_product_rejects_short_description() {
        let req = CreateProductRequest {
            name: "Widget".to_string(),
            description: "short".to_string(),
            price: 9.99,
            brand: "Acme".to_string(),
            category: "Misc".to_string(),
            count_in_stock: 1,
            image: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_product_partial_body_is_valid() {
        let req = UpdateProductRequest {
            name: None,
            description: None,
            price: Some(19.99),
            brand: None,
            category: None,
            count_in_stock: None,
            image: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_product_validates_provided_fields() {
        let req = UpdateProductRequest {
            name: Some("X".to_string()),
            description: None,
            price: None,
            brand: None,
            category: None,
            count_in_stock: None,
            image: None,
        };
        assert!(req.validate().is_err());
    }
}
