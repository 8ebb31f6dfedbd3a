/// Checkout orchestration
///
/// [`CheckoutService`] prices the user's cart, opens a payment intent with
/// the external gateway, and on confirmation materializes an immutable order
/// snapshot and empties the source cart:
///
/// ```text
/// Cart(non-empty)
///   -> [gateway: requires_action -> succeeded]
///   -> Order(created, paid) + Cart(emptied)
/// ```
///
/// The gateway handle is optional: when the payment provider is not
/// configured every checkout operation fails with
/// [`CheckoutError::GatewayUnavailable`]. Nothing here retries; a failed
/// gateway call surfaces to the caller for manual retry.
use std::sync::Arc;

use bson::oid::ObjectId;

use crate::cart::{CartService, ResolvedLine};
use crate::models::{NewOrder, Order, OrderItem};
use crate::payments::{IntentRequest, IntentStatus, PaymentError, PaymentGateway};
use crate::store::{Store, StoreError};

/// Payment method label recorded on orders
const PAYMENT_METHOD: &str = "stripe";

/// Currency used for all charges
const CURRENCY: &str = "usd";

/// Error type for checkout operations
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// No payment gateway is configured
    #[error("Payment processing is not available at the moment")]
    GatewayUnavailable,

    /// The user's cart is missing or has no lines
    #[error("Cart is empty")]
    EmptyCart,

    /// The priced total is not a positive amount
    #[error("Invalid amount")]
    InvalidAmount,

    /// The gateway has not (yet) reported the payment as succeeded
    #[error("Payment not completed")]
    PaymentIncomplete,

    /// The cart referenced at confirmation no longer exists
    #[error("Cart not found")]
    CartNotFound,

    /// Gateway call failed
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A freshly opened payment intent, ready for the client to confirm
#[derive(Debug, Clone)]
pub struct CheckoutIntent {
    /// Gateway intent id
    pub payment_intent_id: String,

    /// Client-usable secret for the payment form
    pub client_secret: Option<String>,

    /// Priced total in dollars
    pub amount: f64,
}

/// An intent's current state, for status polling
#[derive(Debug, Clone)]
pub struct PaymentStatus {
    pub status: IntentStatus,

    /// Amount in dollars
    pub amount: f64,
}

/// Checkout orchestrator
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn Store>,
    cart: CartService,
    gateway: Option<Arc<dyn PaymentGateway>>,
}

impl CheckoutService {
    /// Creates a checkout service over the given store, cart aggregate, and
    /// (optionally configured) payment gateway
    pub fn new(
        store: Arc<dyn Store>,
        cart: CartService,
        gateway: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        Self {
            store,
            cart,
            gateway,
        }
    }

    fn gateway(&self) -> Result<&Arc<dyn PaymentGateway>, CheckoutError> {
        self.gateway
            .as_ref()
            .ok_or(CheckoutError::GatewayUnavailable)
    }

    /// Prices the user's cart and opens a payment intent for the total
    ///
    /// The total is computed over resolvable lines only (orphans are pruned
    /// by the cart read). Fails with [`CheckoutError::EmptyCart`] when there
    /// is nothing to charge and [`CheckoutError::InvalidAmount`] when the
    /// total does not round to a positive number of cents.
    pub async fn create_payment_intent(
        &self,
        user: ObjectId,
    ) -> Result<CheckoutIntent, CheckoutError> {
        let gateway = self.gateway()?;

        let view = self.cart.get_cart(user).await.map_err(map_cart_error)?;
        let Some(cart_id) = view.id else {
            return Err(CheckoutError::EmptyCart);
        };
        if view.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let amount = line_total(&view.items);
        let amount_cents = (amount * 100.0).round() as i64;
        if amount_cents <= 0 {
            return Err(CheckoutError::InvalidAmount);
        }

        let intent = gateway
            .create_intent(IntentRequest {
                amount_cents,
                currency: CURRENCY.to_string(),
                user_id: user.to_hex(),
                cart_id: cart_id.to_hex(),
            })
            .await?;

        Ok(CheckoutIntent {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            amount,
        })
    }

    /// Confirms a payment and materializes the order
    ///
    /// Retrieves the intent from the gateway and refuses to proceed unless
    /// its status is `succeeded`; any other status leaves the cart
    /// untouched. On success the referenced cart's resolvable lines are
    /// snapshotted into a new paid order owned by the requesting user and
    /// the cart is emptied.
    pub async fn confirm_payment(
        &self,
        user: ObjectId,
        payment_intent_id: &str,
        cart_id: ObjectId,
    ) -> Result<Order, CheckoutError> {
        let gateway = self.gateway()?;

        let intent = gateway.retrieve_intent(payment_intent_id).await?;
        if intent.status != IntentStatus::Succeeded {
            return Err(CheckoutError::PaymentIncomplete);
        }

        let cart = self
            .store
            .find_cart(cart_id)
            .await?
            .ok_or(CheckoutError::CartNotFound)?;

        let lines = self.cart.resolve(&cart).await?;
        let order_items: Vec<OrderItem> = lines
            .iter()
            .map(|line| OrderItem {
                product: line.product.id,
                name: line.product.name.clone(),
                qty: line.quantity,
                price: line.product.price,
                image: line.product.image.clone(),
            })
            .collect();
        let total_price = line_total(&lines);

        let order = self
            .store
            .create_order(NewOrder {
                user,
                order_items,
                total_price,
                payment_method: PAYMENT_METHOD.to_string(),
            })
            .await?;

        self.store.save_cart_items(cart.id, &[]).await?;

        Ok(order)
    }

    /// Reports an intent's current gateway status
    pub async fn payment_status(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentStatus, CheckoutError> {
        let gateway = self.gateway()?;
        let intent = gateway.retrieve_intent(payment_intent_id).await?;

        Ok(PaymentStatus {
            status: intent.status,
            amount: intent.amount as f64 / 100.0,
        })
    }
}

/// Sum of quantity x unit price over resolved lines
fn line_total(lines: &[ResolvedLine]) -> f64 {
    lines
        .iter()
        .map(|line| f64::from(line.quantity) * line.product.price)
        .sum()
}

/// Cart reads inside checkout only fail on store errors; map them through
fn map_cart_error(err: crate::cart::CartError) -> CheckoutError {
    match err {
        crate::cart::CartError::Store(e) => CheckoutError::Store(e),
        // get_cart never reports the item-level errors
        _ => CheckoutError::EmptyCart,
    }
}
