/// Bearer-token request authentication
///
/// The API layer wraps protected routes with a middleware that calls
/// [`authenticate`] against the `Authorization` header and injects the
/// resulting [`CurrentUser`] into request extensions for handlers to
/// extract.
///
/// The user document is loaded from the store on every request so a deleted
/// account is rejected immediately, but the role is taken from the token:
/// a role change on the stored user takes effect at the next login.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::jwt::{validate_token, JwtError};
use crate::models::Role;
use crate::store::Store;

/// Authenticated requester, injected into request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Authenticated user id
    pub id: ObjectId,

    /// Display name from the stored user
    pub name: String,

    /// Email from the stored user
    pub email: String,

    /// Role from the token (not re-derived from the stored user)
    pub role: Role,
}

impl CurrentUser {
    /// Checks whether the requester holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error type for request authentication
#[derive(Debug)]
pub enum AuthError {
    /// Missing Authorization header
    MissingCredentials,

    /// Authorization header is not a Bearer token
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token subject no longer exists in the store
    UserNotFound,

    /// Store lookup failed
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::UserNotFound => {
                (StatusCode::UNAUTHORIZED, "User not found").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Authenticates a request from its `Authorization` header value
///
/// Parses the Bearer token, validates it, and loads the current user from
/// the store.
///
/// # Errors
///
/// - [`AuthError::MissingCredentials`] when the header is absent
/// - [`AuthError::InvalidFormat`] when the header is not `Bearer <token>`
/// - [`AuthError::InvalidToken`] when validation fails or the token expired
/// - [`AuthError::UserNotFound`] when the subject was deleted
pub async fn authenticate(
    store: &dyn Store,
    secret: &str,
    auth_header: Option<&str>,
) -> Result<CurrentUser, AuthError> {
    let auth_header = auth_header.ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid token issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {e}")),
    })?;

    let user_id = claims
        .user_id()
        .map_err(|e| AuthError::InvalidToken(format!("Invalid token: {e}")))?;

    let user = store
        .find_user(user_id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UserNotFound)?;

    Ok(CurrentUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: claims.role,
    })
}
