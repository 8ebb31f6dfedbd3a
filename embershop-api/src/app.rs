/// Application state and router builder
///
/// Defines the shared application state and builds the axum router with all
/// routes and middleware. Store and gateway handles are injected here at
/// construction time; nothing in the request path touches a global client.
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                              # Health check (public)
/// └── /v1/api/
///     ├── /auth/
///     │   ├── POST /register               # public
///     │   ├── POST /login                  # public
///     │   └── GET|PUT /profile             # bearer JWT
///     ├── /products/
///     │   ├── GET /                        # public
///     │   ├── GET /:id                     # public
///     │   └── POST|PUT|DELETE [...]        # bearer JWT + admin role
///     ├── /cart/                           # bearer JWT
///     │   ├── POST /addToCart
///     │   ├── GET /
///     │   ├── PUT /updateQuantity
///     │   ├── DELETE /removeItem
///     │   └── DELETE /clearCart
///     └── /checkout/                       # bearer JWT
///         ├── POST /create-payment-intent
///         ├── POST /confirm-payment
///         └── GET /payment-status/:id
/// ```
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use embershop_shared::auth::middleware::{authenticate, CurrentUser};
use embershop_shared::cart::CartService;
use embershop_shared::checkout::CheckoutService;
use embershop_shared::payments::PaymentGateway;
use embershop_shared::store::Store;

use crate::config::Config;
use crate::error::ApiError;

/// Shared application state
///
/// Cloned for each request handler via axum's `State` extractor; all fields
/// are cheap Arc clones.
#[derive(Clone)]
pub struct AppState {
    /// Document store handle
    pub store: Arc<dyn Store>,

    /// Cart aggregate service
    pub cart: CartService,

    /// Checkout orchestrator
    pub checkout: CheckoutService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires up the services from a store, an optional gateway, and config
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        config: Config,
    ) -> Self {
        let cart = CartService::new(store.clone());
        let checkout = CheckoutService::new(store.clone(), cart.clone(), gateway);
        Self {
            store,
            cart,
            checkout,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes: register/login public, profile behind bearer auth
    let profile_routes = Router::new()
        .route(
            "/profile",
            get(routes::auth::get_profile).put(routes::auth::update_profile),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(profile_routes);

    // Catalog: reads public, mutation admin-only
    let product_admin_routes = Router::new()
        .route("/", post(routes::products::create_product))
        .route(
            "/:id",
            put(routes::products::update_product).delete(routes::products::delete_product),
        )
        .layer(axum::middleware::from_fn(require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));
    let product_routes = Router::new()
        .route("/", get(routes::products::list_products))
        .route("/:id", get(routes::products::get_product))
        .merge(product_admin_routes);

    // Cart routes (bearer auth)
    let cart_routes = Router::new()
        .route("/addToCart", post(routes::cart::add_to_cart))
        .route("/", get(routes::cart::get_cart))
        .route("/updateQuantity", put(routes::cart::update_quantity))
        .route("/removeItem", delete(routes::cart::remove_item))
        .route("/clearCart", delete(routes::cart::clear_cart))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Checkout routes (bearer auth)
    let checkout_routes = Router::new()
        .route(
            "/create-payment-intent",
            post(routes::checkout::create_payment_intent),
        )
        .route("/confirm-payment", post(routes::checkout::confirm_payment))
        .route("/payment-status/:id", get(routes::checkout::payment_status))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/products", product_routes)
        .nest("/cart", cart_routes)
        .nest("/checkout", checkout_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: explicit origin list
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Validates the `Authorization: Bearer <token>` header, loads the current
/// user from the store, and injects a [`CurrentUser`] into request
/// extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let current_user = authenticate(state.store.as_ref(), state.jwt_secret(), auth_header).await?;

    req.extensions_mut().insert(current_user);

    Ok(next.run(req).await)
}

/// Admin role check, applied after `jwt_auth_layer`
///
/// The role comes from the token claims; a user whose role changed after
/// login keeps their old privileges until the token expires.
async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<CurrentUser>() {
        Some(user) if user.is_admin() => Ok(next.run(req).await),
        Some(_) => Err(ApiError::Forbidden("Admin access required".to_string())),
        None => Err(ApiError::Unauthorized("Not authorized".to_string())),
    }
}
