/// Checkout endpoints
///
/// All routes require a bearer token and answer 503 when the payment
/// gateway is not configured.
///
/// # Endpoints
///
/// - `POST /v1/api/checkout/create-payment-intent` - Price the cart and
///   open a payment intent
/// - `POST /v1/api/checkout/confirm-payment` - Materialize the order once
///   the gateway reports success
/// - `GET /v1/api/checkout/payment-status/:id` - Intent status passthrough
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use embershop_shared::auth::middleware::CurrentUser;

use crate::{app::AppState, error::ApiResult, routes::parse_object_id};

/// Payment intent response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub success: bool,

    /// Secret the payment form hands to the gateway's JS SDK
    pub client_secret: Option<String>,

    /// Priced cart total in dollars
    pub amount: f64,

    pub payment_intent_id: String,
}

/// Confirm-payment request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    #[validate(length(min = 1, message = "Payment intent ID is required"))]
    pub payment_intent_id: String,

    #[validate(length(min = 1, message = "Cart ID is required"))]
    pub cart_id: String,
}

/// Confirm-payment response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub message: String,

    /// Materialized order id
    pub order_id: String,
}

/// Payment status response
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub success: bool,

    /// Gateway status string (e.g. "requires_action", "succeeded")
    pub status: String,

    /// Amount in dollars
    pub amount: f64,
}

/// Price the cart and open a payment intent
///
/// The total is Σ(quantity x unit price) over resolvable lines only.
///
/// # Errors
///
/// - `400 Bad Request`: cart empty, or total not positive
/// - `503 Service Unavailable`: payment gateway not configured
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<CreateIntentResponse>> {
    let intent = state.checkout.create_payment_intent(current.id).await?;

    tracing::info!(intent_id = %intent.payment_intent_id, "payment intent created");

    Ok(Json(CreateIntentResponse {
        success: true,
        client_secret: intent.client_secret,
        amount: intent.amount,
        payment_intent_id: intent.payment_intent_id,
    }))
}

/// Confirm a payment and materialize the order
///
/// Only proceeds when the gateway reports the intent as `succeeded`; any
/// other status leaves the cart untouched. On success the cart's lines are
/// snapshotted into an immutable paid order and the cart is emptied.
///
/// # Errors
///
/// - `400 Bad Request`: validation failure or payment not completed
/// - `404 Not Found`: referenced cart no longer exists
/// - `503 Service Unavailable`: payment gateway not configured
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> ApiResult<Json<ConfirmPaymentResponse>> {
    req.validate()?;
    let cart_id = parse_object_id(&req.cart_id)?;

    let order = state
        .checkout
        .confirm_payment(current.id, &req.payment_intent_id, cart_id)
        .await?;

    tracing::info!(order_id = %order.id, total = order.total_price, "order created");

    Ok(Json(ConfirmPaymentResponse {
        success: true,
        message: "Payment successful".to_string(),
        order_id: order.id.to_hex(),
    }))
}

/// Report an intent's current gateway status
///
/// # Errors
///
/// - `503 Service Unavailable`: payment gateway not configured
pub async fn payment_status(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(payment_intent_id): Path<String>,
) -> ApiResult<Json<PaymentStatusResponse>> {
    let status = state.checkout.payment_status(&payment_intent_id).await?;

    Ok(Json(PaymentStatusResponse {
        success: true,
        status: status.status.to_string(),
        amount: status.amount,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_payment_request_validation() {
        let valid: ConfirmPaymentRequest = serde_json::from_str(
            r#"{ "paymentIntentId": "pi_123", "cartId": "507f1f77bcf86cd799439011" }"#,
        )
        .unwrap();
        assert!(valid.validate().is_ok());

        let empty: ConfirmPaymentRequest =
            serde_json::from_str(r#"{ "paymentIntentId": "", "cartId": "" }"#).unwrap();
        assert!(empty.validate().is_err());
    }
}
