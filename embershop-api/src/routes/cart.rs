/// Cart endpoints
///
/// All routes require a bearer token; the cart operated on is always the
/// authenticated user's own.
///
/// # Endpoints
///
/// - `POST /v1/api/cart/addToCart` - Add a product (quantities merge)
/// - `GET /v1/api/cart` - Read the cart, pruning orphaned lines
/// - `PUT /v1/api/cart/updateQuantity` - Overwrite a line's quantity
/// - `DELETE /v1/api/cart/removeItem` - Remove a line
/// - `DELETE /v1/api/cart/clearCart` - Empty the cart
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use embershop_shared::auth::middleware::CurrentUser;
use embershop_shared::cart::CartView;
use embershop_shared::models::Cart;

use crate::{app::AppState, error::ApiResult, routes::parse_object_id};

use super::products::ProductResponse;

fn default_quantity() -> u32 {
    1
}

/// Add-to-cart request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    /// Product to add
    pub product_id: String,

    /// Units to merge into the cart line (defaults to 1)
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 100, message = "Quantity must be between 1 and 100"))]
    pub quantity: u32,
}

/// Update-quantity request
///
/// A quantity of zero or less removes the line.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    /// Product whose line is updated
    pub product_id: String,

    /// New quantity; <= 0 removes the line
    #[validate(range(max = 100, message = "Quantity cannot exceed 100"))]
    pub quantity: i64,
}

/// Remove-item request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    /// Product whose line is removed
    #[validate(length(min = 1, message = "Product ID is required"))]
    pub product_id: String,
}

/// Raw cart line (product referenced by id)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
    pub product: String,
    pub quantity: u32,
}

/// Cart as stored, returned by mutations
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: String,
    pub user: String,
    pub items: Vec<CartLineResponse>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            id: cart.id.to_hex(),
            user: cart.user.to_hex(),
            items: cart
                .items
                .into_iter()
                .map(|item| CartLineResponse {
                    product: item.product.to_hex(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// Mutation outcome: a message plus the updated cart
#[derive(Debug, Serialize, Deserialize)]
pub struct CartMutationResponse {
    pub message: String,
    pub cart: CartResponse,
}

/// Cart line with its product resolved
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLineResponse {
    pub product: ProductResponse,
    pub quantity: u32,
}

/// Cart read response: lines resolved, orphans already pruned
///
/// `id` is absent when the user has no cart document yet; `items` is then
/// an empty list rather than the read failing.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartViewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub items: Vec<ResolvedLineResponse>,
}

impl From<CartView> for CartViewResponse {
    fn from(view: CartView) -> Self {
        Self {
            id: view.id.map(|id| id.to_hex()),
            items: view
                .items
                .into_iter()
                .map(|line| ResolvedLineResponse {
                    product: line.product.into(),
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

/// Add a product to the cart
///
/// Creates the cart lazily on the first item; adding a product that is
/// already in the cart merges the quantities.
///
/// # Errors
///
/// - `400 Bad Request`: malformed product id or quantity out of range
/// - `404 Not Found`: product does not exist
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<AddToCartRequest>,
) -> ApiResult<Json<CartMutationResponse>> {
    req.validate()?;
    let product_id = parse_object_id(&req.product_id)?;

    let cart = state
        .cart
        .add_item(current.id, product_id, req.quantity)
        .await?;

    Ok(Json(CartMutationResponse {
        message: "Product added to cart".to_string(),
        cart: cart.into(),
    }))
}

/// Read the cart
///
/// Orphaned lines are pruned (and the cleaned cart persisted) before the
/// response is built; a user without a cart gets an empty items list.
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<CartViewResponse>> {
    let view = state.cart.get_cart(current.id).await?;
    Ok(Json(view.into()))
}

/// Overwrite a cart line's quantity
///
/// A quantity of zero or less removes the line.
///
/// # Errors
///
/// - `404 Not Found`: product, cart, or line does not exist
pub async fn update_quantity(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateQuantityRequest>,
) -> ApiResult<Json<CartMutationResponse>> {
    req.validate()?;
    let product_id = parse_object_id(&req.product_id)?;

    let cart = state
        .cart
        .set_item_quantity(current.id, product_id, req.quantity)
        .await?;

    Ok(Json(CartMutationResponse {
        message: "Cart updated".to_string(),
        cart: cart.into(),
    }))
}

/// Remove a cart line
///
/// # Errors
///
/// - `404 Not Found`: cart or line does not exist
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<RemoveItemRequest>,
) -> ApiResult<Json<CartMutationResponse>> {
    req.validate()?;
    let product_id = parse_object_id(&req.product_id)?;

    let cart = state.cart.remove_item(current.id, product_id).await?;

    Ok(Json(CartMutationResponse {
        message: "Item removed from cart".to_string(),
        cart: cart.into(),
    }))
}

/// Empty the cart
///
/// Idempotent: clearing an already-empty or missing cart succeeds and
/// returns a valid cart with zero lines.
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<CartMutationResponse>> {
    let cart = state.cart.clear(current.id).await?;

    Ok(Json(CartMutationResponse {
        message: "Cart cleared successfully".to_string(),
        cart: cart.into(),
    }))
}
