/// JWT token generation and validation
///
/// Tokens are signed with HS256 and carry the user's id, email, and role.
/// Every token expires 24 hours after issuance; there is no refresh flow,
/// clients simply log in again.
///
/// # Claims
///
/// - `sub`: user id (24-char hex ObjectId)
/// - `iss`: always "embershop"
/// - `iat` / `exp` / `nbf`: issuance, expiry, not-before (Unix seconds)
/// - `email`, `role`: copied from the user at login; a role change on the
///   stored user only takes effect when a new token is issued
use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Token lifetime
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

const ISSUER: &str = "embershop";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("invalid token issuer")]
    InvalidIssuer,

    /// The subject claim is not a valid ObjectId
    #[error("invalid subject claim: {0}")]
    InvalidSubject(String),
}

/// Claims carried by every Embershop token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id as a hex string
    pub sub: String,

    /// Issuer - always "embershop"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// User email at issuance time
    pub email: String,

    /// User role at issuance time
    pub role: Role,
}

impl Claims {
    /// Creates claims with the standard 24-hour expiry
    pub fn new(user_id: ObjectId, email: &str, role: Role) -> Self {
        Self::with_lifetime(user_id, email, role, Duration::hours(TOKEN_LIFETIME_HOURS))
    }

    /// Creates claims with a custom lifetime (used by tests)
    pub fn with_lifetime(user_id: ObjectId, email: &str, role: Role, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_hex(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            nbf: now.timestamp(),
            email: email.to_string(),
            role,
        }
    }

    /// Parses the subject claim back into an ObjectId
    pub fn user_id(&self) -> Result<ObjectId, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }

    /// Checks whether the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns [`JwtError::CreateError`] when encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("token encoding failed: {e}")))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, expiry, not-before time, and issuer.
///
/// # Errors
///
/// Returns [`JwtError::Expired`] for expired tokens,
/// [`JwtError::InvalidIssuer`] for foreign tokens, and
/// [`JwtError::ValidationError`] for everything else.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("token validation failed: {e}")),
    })?;

    Ok(token_data.claims)
}
