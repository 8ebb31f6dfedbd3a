/// Shared helpers for router-level tests
///
/// Builds the real axum router against the in-memory store and the mock
/// payment gateway, so the full request path (routing, middleware,
/// validation, error mapping) is exercised without external services.
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use embershop_api::app::{build_router, AppState};
use embershop_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, StripeConfig};
use embershop_shared::payments::{MockGateway, PaymentGateway};
use embershop_shared::store::MemoryStore;

pub const JWT_SECRET: &str = "integration-test-secret-key-32-bytes!!";

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<MockGateway>,
}

fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            uri: "mongodb://unused".to_string(),
            database: "unused".to_string(),
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        stripe: StripeConfig { secret_key: None },
    }
}

impl TestContext {
    /// Context with a configured (mock) payment gateway
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Context without a payment gateway; checkout routes answer 503
    pub fn without_gateway() -> Self {
        Self::build(false)
    }

    fn build(with_gateway: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockGateway::new());

        let gateway_handle: Option<Arc<dyn PaymentGateway>> = if with_gateway {
            Some(gateway.clone() as Arc<dyn PaymentGateway>)
        } else {
            None
        };

        let state = AppState::new(store.clone(), gateway_handle, test_config());
        let app = build_router(state);

        Self {
            app,
            store,
            gateway,
        }
    }
}

/// Sends a JSON request and returns the status plus parsed body
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should not fail at the transport level");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Registers a user and logs them in, returning a bearer token
pub async fn register_and_login(app: &Router, name: &str, email: &str, role: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/v1/api/auth/register",
        None,
        Some(serde_json::json!({
            "name": name,
            "email": email,
            "password": "Sup3rSecretPw!",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration should succeed");

    let (status, body) = send(
        app,
        "POST",
        "/v1/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "Sup3rSecretPw!",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login should succeed");

    body["token"]
        .as_str()
        .expect("login response should carry a token")
        .to_string()
}

/// Creates a product via the admin API and returns its id
pub async fn create_product(
    app: &Router,
    admin_token: &str,
    name: &str,
    price: f64,
) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/v1/api/products",
        Some(admin_token),
        Some(serde_json::json!({
            "name": name,
            "description": format!("{name} - a thoroughly described product"),
            "price": price,
            "brand": "Acme",
            "category": "Test",
            "countInStock": 10,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "product creation should succeed");

    body["id"]
        .as_str()
        .expect("product response should carry an id")
        .to_string()
}
