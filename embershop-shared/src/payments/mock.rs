/// Mock payment gateway
///
/// In-process [`PaymentGateway`] with a scriptable retrieve status, used by
/// the checkout tests and the router-level test suite. Created intents are
/// remembered so `retrieve_intent` can echo their amounts back; the status
/// reported on retrieval is whatever the test last configured.
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{IntentRequest, IntentStatus, PaymentError, PaymentGateway, PaymentIntent};

struct MockState {
    retrieve_status: IntentStatus,
    fail_next: bool,
    counter: u64,
    intents: HashMap<String, i64>,
}

/// Scriptable gateway for tests
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Creates a gateway whose intents report `requires_payment_method`
    /// until [`set_status`](Self::set_status) is called
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                retrieve_status: IntentStatus::RequiresPaymentMethod,
                fail_next: false,
                counter: 0,
                intents: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Sets the status reported by subsequent `retrieve_intent` calls
    pub fn set_status(&self, status: IntentStatus) {
        self.lock().retrieve_status = status;
    }

    /// Makes the next gateway call fail with an API error
    pub fn fail_next(&self) {
        self.lock().fail_next = true;
    }

    fn take_failure(&self) -> Option<PaymentError> {
        let mut state = self.lock();
        if state.fail_next {
            state.fail_next = false;
            Some(PaymentError::Api {
                status: 502,
                message: "mock gateway failure".to_string(),
            })
        } else {
            None
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(&self, request: IntentRequest) -> Result<PaymentIntent, PaymentError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut state = self.lock();
        state.counter += 1;
        let id = format!("pi_mock_{}", state.counter);
        state.intents.insert(id.clone(), request.amount_cents);

        Ok(PaymentIntent {
            client_secret: Some(format!("{id}_secret")),
            id,
            status: IntentStatus::RequiresPaymentMethod,
            amount: request.amount_cents,
        })
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let state = self.lock();
        let amount = state
            .intents
            .get(id)
            .copied()
            .ok_or_else(|| PaymentError::Api {
                status: 404,
                message: format!("no such intent: {id}"),
            })?;

        Ok(PaymentIntent {
            id: id.to_string(),
            client_secret: Some(format!("{id}_secret")),
            status: state.retrieve_status,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount_cents: i64) -> IntentRequest {
        IntentRequest {
            amount_cents,
            currency: "usd".to_string(),
            user_id: "user".to_string(),
            cart_id: "cart".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_retrieve() {
        let gateway = MockGateway::new();
        let created = gateway.create_intent(request(2500)).await.unwrap();
        assert!(created.client_secret.is_some());

        gateway.set_status(IntentStatus::Succeeded);
        let retrieved = gateway.retrieve_intent(&created.id).await.unwrap();
        assert_eq!(retrieved.status, IntentStatus::Succeeded);
        assert_eq!(retrieved.amount, 2500);
    }

    #[tokio::test]
    async fn test_unknown_intent() {
        let gateway = MockGateway::new();
        let result = gateway.retrieve_intent("pi_nope").await;
        assert!(matches!(result, Err(PaymentError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let gateway = MockGateway::new();
        gateway.fail_next();
        assert!(gateway.create_intent(request(100)).await.is_err());
        // Failure is one-shot
        assert!(gateway.create_intent(request(100)).await.is_ok());
    }
}
