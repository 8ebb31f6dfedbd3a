//! # Embershop API Server
//!
//! JSON REST backend for the Embershop storefront SPA: catalog browsing,
//! authenticated cart management, profile management, and Stripe-based
//! checkout over a MongoDB document store.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p embershop-api
//! ```

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use embershop_api::{
    app::{build_router, AppState},
    config::Config,
};
use embershop_shared::payments::{PaymentGateway, StripeGateway};
use embershop_shared::store::MongoStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "embershop_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Embershop API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let store = MongoStore::connect(&config.database.uri, &config.database.database).await?;
    store.ensure_indexes().await?;

    let gateway: Option<Arc<dyn PaymentGateway>> = config
        .stripe
        .secret_key
        .as_deref()
        .map(|key| Arc::new(StripeGateway::new(key)) as Arc<dyn PaymentGateway>);
    if gateway.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY not set; checkout endpoints will answer 503");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(store), gateway, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
