/// Payment gateway seam
///
/// The payment provider is an external collaborator exposed through two
/// operations: create an intent for an amount, and retrieve an intent's
/// current state. The [`PaymentGateway`] trait captures that contract so the
/// checkout orchestrator receives a gateway handle at construction; when no
/// gateway is configured the orchestrator holds `None` and checkout routes
/// answer 503.
///
/// Implementations:
/// - [`StripeGateway`]: Stripe REST API over reqwest
/// - [`MockGateway`]: in-process gateway with a scriptable status, for tests
pub mod mock;
pub mod stripe;

pub use mock::MockGateway;
pub use stripe::StripeGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Transport-level failure
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway answered with an error status
    #[error("gateway error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Lifecycle state of a payment intent, as reported by the gateway
///
/// Only `Succeeded` allows an order to be materialized; every other state
/// leaves the cart untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,

    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

impl IntentStatus {
    /// Gets the status as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for opening a payment intent
#[derive(Debug, Clone)]
pub struct IntentRequest {
    /// Charge amount in the currency's smallest unit (cents)
    pub amount_cents: i64,

    /// ISO currency code (lowercase, e.g. "usd")
    pub currency: String,

    /// Requesting user id, attached as gateway metadata
    pub user_id: String,

    /// Source cart id, attached as gateway metadata
    pub cart_id: String,
}

/// A payment intent as reported by the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Opaque gateway intent id
    pub id: String,

    /// Client-usable secret; present on freshly created intents
    pub client_secret: Option<String>,

    /// Current lifecycle state
    pub status: IntentStatus,

    /// Amount in cents
    pub amount: i64,
}

/// Payment gateway contract
///
/// Calls are synchronous awaits with the HTTP client's default timeouts; no
/// retry is attempted at this layer, failures surface to the caller.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment intent for the given amount
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, PaymentError>;

    /// Retrieves an intent's current state
    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError>;
}
