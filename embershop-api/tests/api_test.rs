/// Router-level tests for the Embershop API
///
/// These drive the real router end to end over the in-memory store and mock
/// gateway: routing, auth middleware, validation, error mapping, and the
/// cart-to-order flow.
mod common;

use axum::http::StatusCode;
use common::{create_product, register_and_login, send, TestContext};
use embershop_shared::payments::IntentStatus;
use serde_json::json;

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();

    let (status, body) = send(&ctx.app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_login_profile_flow() {
    let ctx = TestContext::new();

    // Register
    let (status, body) = send(
        &ctx.app,
        "POST",
        "/v1/api/auth/register",
        None,
        Some(json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "password": "Sup3rSecretPw!",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "user");

    // Duplicate email is a conflict
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/api/auth/register",
        None,
        Some(json!({
            "name": "Jane Again",
            "email": "jane@example.com",
            "password": "Sup3rSecretPw!",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Wrong password is rejected
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/api/auth/login",
        None,
        Some(json!({ "email": "jane@example.com", "password": "WrongPw!!!" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Login and read the profile
    let (status, body) = send(
        &ctx.app,
        "POST",
        "/v1/api/auth/login",
        None,
        Some(json!({ "email": "jane@example.com", "password": "Sup3rSecretPw!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token").to_string();

    let (status, body) = send(&ctx.app, "GET", "/v1/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jane@example.com");
    assert_eq!(body["name"], "Jane Doe");

    // Update the profile with a complete address
    let (status, body) = send(
        &ctx.app,
        "PUT",
        "/v1/api/auth/profile",
        Some(&token),
        Some(json!({
            "name": "Jane Q. Doe",
            "phone": "+1 555 0100",
            "address": {
                "street": "1 Main St",
                "city": "Springfield",
                "state": "IL",
                "postalCode": "62701",
                "country": "US"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Jane Q. Doe");
    assert_eq!(body["address"]["city"], "Springfield");
    // Email is immutable
    assert_eq!(body["email"], "jane@example.com");

    // Partial address is rejected with a field list
    let (status, body) = send(
        &ctx.app,
        "PUT",
        "/v1/api/auth/profile",
        Some(&token),
        Some(json!({
            "name": "Jane Q. Doe",
            "address": { "street": "1 Main St" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("city"));

    // Too-short name is a validation failure
    let (status, _) = send(
        &ctx.app,
        "PUT",
        "/v1/api/auth/profile",
        Some(&token),
        Some(json!({ "name": "ab" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new();

    for (method, uri) in [
        ("GET", "/v1/api/cart"),
        ("GET", "/v1/api/auth/profile"),
        ("POST", "/v1/api/checkout/create-payment-intent"),
    ] {
        let (status, _) = send(&ctx.app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_catalog_admin_flow() {
    let ctx = TestContext::new();
    let admin = register_and_login(&ctx.app, "Admin", "admin@example.com", "admin").await;
    let shopper = register_and_login(&ctx.app, "Shopper", "shopper@example.com", "user").await;

    // Non-admin cannot create products
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/api/products",
        Some(&shopper),
        Some(json!({
            "name": "Forbidden",
            "description": "Should never make it into the catalog",
            "price": 1.0,
            "brand": "Acme",
            "category": "Test",
            "countInStock": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin creates one; placeholder image is derived from the name
    let id = create_product(&ctx.app, &admin, "Sony WH-1000XM5", 349.99).await;

    // Catalog reads are public
    let (status, body) = send(&ctx.app, "GET", "/v1/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 1);

    let (status, body) = send(&ctx.app, "GET", &format!("/v1/api/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Sony WH-1000XM5");
    assert!(body["image"]
        .as_str()
        .expect("image")
        .contains("via.placeholder.com"));

    // Malformed and unknown ids
    let (status, _) = send(&ctx.app, "GET", "/v1/api/products/not-hex", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &ctx.app,
        "GET",
        "/v1/api/products/507f1f77bcf86cd799439011",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Field-wise update keeps everything not mentioned
    let (status, body) = send(
        &ctx.app,
        "PUT",
        &format!("/v1/api/products/{id}"),
        Some(&admin),
        Some(json!({ "price": 299.99 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 299.99);
    assert_eq!(body["name"], "Sony WH-1000XM5");

    // Delete, then the product is gone
    let (status, _) = send(
        &ctx.app,
        "DELETE",
        &format!("/v1/api/products/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&ctx.app, "GET", &format!("/v1/api/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_flow() {
    let ctx = TestContext::new();
    let admin = register_and_login(&ctx.app, "Admin", "admin@example.com", "admin").await;
    let token = register_and_login(&ctx.app, "Shopper", "shopper@example.com", "user").await;

    let product = create_product(&ctx.app, &admin, "Widget", 10.0).await;

    // Empty view before any mutation
    let (status, body) = send(&ctx.app, "GET", "/v1/api/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().expect("items").len(), 0);

    // addToCart twice with the same product accumulates quantity
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/api/cart/addToCart",
        Some(&token),
        Some(json!({ "productId": product, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/v1/api/cart/addToCart",
        Some(&token),
        Some(json!({ "productId": product, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["items"][0]["quantity"], 3);

    // Unknown product is a 404
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/api/cart/addToCart",
        Some(&token),
        Some(json!({ "productId": "507f1f77bcf86cd799439011", "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Out-of-range quantity is a validation failure
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/api/cart/addToCart",
        Some(&token),
        Some(json!({ "productId": product, "quantity": 101 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Zero quantity removes the line, cart remains valid
    let (status, body) = send(
        &ctx.app,
        "PUT",
        "/v1/api/cart/updateQuantity",
        Some(&token),
        Some(json!({ "productId": product, "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["items"].as_array().expect("items").len(), 0);

    // Removing the now-absent line is a line-level 404
    let (status, _) = send(
        &ctx.app,
        "DELETE",
        "/v1/api/cart/removeItem",
        Some(&token),
        Some(json!({ "productId": product })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // clearCart is idempotent
    let (status, body) = send(&ctx.app, "DELETE", "/v1/api/cart/clearCart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["items"].as_array().expect("items").len(), 0);
}

#[tokio::test]
async fn test_cart_prunes_orphaned_lines_on_read() {
    let ctx = TestContext::new();
    let admin = register_and_login(&ctx.app, "Admin", "admin@example.com", "admin").await;
    let token = register_and_login(&ctx.app, "Shopper", "shopper@example.com", "user").await;

    let kept = create_product(&ctx.app, &admin, "Kept", 10.0).await;
    let doomed = create_product(&ctx.app, &admin, "Doomed", 5.0).await;

    for (product, qty) in [(&kept, 1), (&doomed, 2)] {
        let (status, _) = send(
            &ctx.app,
            "POST",
            "/v1/api/cart/addToCart",
            Some(&token),
            Some(json!({ "productId": product, "quantity": qty })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(
        &ctx.app,
        "DELETE",
        &format!("/v1/api/products/{doomed}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The orphaned line never shows up in a read
    let (status, body) = send(&ctx.app, "GET", "/v1/api/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product"]["name"], "Kept");
}

#[tokio::test]
async fn test_checkout_flow() {
    let ctx = TestContext::new();
    let admin = register_and_login(&ctx.app, "Admin", "admin@example.com", "admin").await;
    let token = register_and_login(&ctx.app, "Shopper", "shopper@example.com", "user").await;

    // Cart {A: $10 x 2, B: $5 x 1} prices to 25
    let a = create_product(&ctx.app, &admin, "Product A", 10.0).await;
    let b = create_product(&ctx.app, &admin, "Product B", 5.0).await;
    for (product, qty) in [(&a, 2), (&b, 1)] {
        send(
            &ctx.app,
            "POST",
            "/v1/api/cart/addToCart",
            Some(&token),
            Some(json!({ "productId": product, "quantity": qty })),
        )
        .await;
    }

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/v1/api/checkout/create-payment-intent",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 25.0);
    let intent_id = body["paymentIntentId"].as_str().expect("intent id").to_string();
    assert!(body["clientSecret"].as_str().is_some());

    let (_, cart_body) = send(&ctx.app, "GET", "/v1/api/cart", Some(&token), None).await;
    let cart_id = cart_body["id"].as_str().expect("cart id").to_string();

    // Confirming before the gateway reports success changes nothing
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/api/checkout/confirm-payment",
        Some(&token),
        Some(json!({ "paymentIntentId": intent_id, "cartId": cart_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.store.order_count(), 0);

    // Status polling reflects the gateway state
    ctx.gateway.set_status(IntentStatus::RequiresAction);
    let (status, body) = send(
        &ctx.app,
        "GET",
        &format!("/v1/api/checkout/payment-status/{intent_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "requires_action");
    assert_eq!(body["amount"], 25.0);

    // Once succeeded, the order materializes and the cart empties
    ctx.gateway.set_status(IntentStatus::Succeeded);
    let (status, body) = send(
        &ctx.app,
        "POST",
        "/v1/api/checkout/confirm-payment",
        Some(&token),
        Some(json!({ "paymentIntentId": intent_id, "cartId": cart_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["orderId"].as_str().is_some());

    let orders = ctx.store.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total_price, 25.0);
    assert!(orders[0].is_paid);

    let (_, cart_body) = send(&ctx.app, "GET", "/v1/api/cart", Some(&token), None).await;
    assert_eq!(cart_body["items"].as_array().expect("items").len(), 0);

    // An empty cart cannot start another checkout
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/api/checkout/create-payment-intent",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_without_gateway_is_503() {
    let ctx = TestContext::without_gateway();
    let token = register_and_login(&ctx.app, "Shopper", "shopper@example.com", "user").await;

    let (status, _) = send(
        &ctx.app,
        "POST",
        "/v1/api/checkout/create-payment-intent",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(
        &ctx.app,
        "GET",
        "/v1/api/checkout/payment-status/pi_123",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
