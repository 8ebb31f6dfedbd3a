//! API route handlers
//!
//! Each module owns its request/response types; every body is
//! schema-validated before it reaches a service.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod products;

use bson::oid::ObjectId;

use crate::error::ApiError;

/// Parses a path/body id string into an ObjectId
///
/// Malformed ids are a client error, mirroring the store's 24-char hex
/// format requirement.
pub(crate) fn parse_object_id(value: &str) -> Result<ObjectId, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid product ID format".to_string()))
}
