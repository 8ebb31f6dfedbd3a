//! Authentication utilities
//!
//! - `jwt`: HS256 token issuance and validation (24-hour expiry)
//! - `password`: Argon2id password hashing and verification
//! - `middleware`: bearer-token request authentication and the
//!   [`CurrentUser`](middleware::CurrentUser) context handlers extract

pub mod jwt;
pub mod middleware;
pub mod password;
