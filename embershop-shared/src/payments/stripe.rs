/// Stripe payment gateway client
///
/// Talks to the Stripe REST API (form-encoded requests, JSON responses)
/// using the account's secret key as a bearer credential. Intents are
/// created with automatic payment methods enabled and carry the requesting
/// user and source cart ids as metadata, so a charge can always be traced
/// back to the cart that produced it.
use async_trait::async_trait;
use serde::Deserialize;

use super::{IntentRequest, PaymentError, PaymentGateway, PaymentIntent};

/// Stripe API base URL
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Stripe gateway handle
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

/// Error payload shape returned by Stripe
#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl StripeGateway {
    /// Creates a gateway client for the given secret key
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL (used by tests against a stub server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Turns a non-success response into a [`PaymentError::Api`]
    async fn error_from_response(response: reqwest::Response) -> PaymentError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or(body);
        PaymentError::Api { status, message }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/payment_intents", self.base_url);
        let amount = request.amount_cents.to_string();

        let params = [
            ("amount", amount.as_str()),
            ("currency", request.currency.as_str()),
            ("automatic_payment_methods[enabled]", "true"),
            ("metadata[userId]", request.user_id.as_str()),
            ("metadata[cartId]", request.cart_id.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/payment_intents/{id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(response.json().await?)
    }
}
