/// Authentication and profile endpoints
///
/// # Endpoints
///
/// - `POST /v1/api/auth/register` - Register a new account
/// - `POST /v1/api/auth/login` - Login and get a 24h bearer token
/// - `GET /v1/api/auth/profile` - Current user's profile (bearer JWT)
/// - `PUT /v1/api/auth/profile` - Update profile; email is immutable
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use embershop_shared::auth::jwt::{create_token, Claims};
use embershop_shared::auth::middleware::CurrentUser;
use embershop_shared::auth::password::{hash_password, verify_password};
use embershop_shared::models::{Address, NewUser, ProfileUpdate, Role, User};
use embershop_shared::store::Store;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Register request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Optional shipping address (all five fields required when present)
    pub address: Option<AddressPayload>,

    /// Account role; defaults to "user"
    pub role: Option<Role>,
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Human-readable outcome
    pub message: String,

    /// Newly created user id
    pub user_id: String,

    /// Granted role
    pub role: Role,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Requested role; asking for "admin" without holding it is a 403
    pub role: Option<Role>,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Human-readable outcome
    pub message: String,

    /// Bearer token, valid for 24 hours
    pub token: String,

    /// Logged-in user summary
    pub user: UserSummary,
}

/// Compact user representation returned at login
#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Address fields as submitted by clients
///
/// Kept optional at the deserialization layer so a partial address can be
/// reported as a field-level validation failure rather than a parse error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Full profile representation
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// New display name
    #[validate(length(min = 3, message = "Name is required and must be at least 3 characters"))]
    pub name: String,

    /// New phone number; omitting clears the stored value
    pub phone: Option<String>,

    /// New address; omitting clears the stored value
    pub address: Option<AddressPayload>,
}

/// Profile update response
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProfileResponse {
    pub message: String,

    #[serde(flatten)]
    pub profile: ProfileResponse,
}

/// Checks an address payload for completeness
///
/// All five fields must be present and non-blank; the error names every
/// missing field, mirroring what the storefront shows next to the form.
fn complete_address(payload: AddressPayload) -> Result<Address, ApiError> {
    let fields = [
        ("street", &payload.street),
        ("city", &payload.city),
        ("state", &payload.state),
        ("postalCode", &payload.postal_code),
        ("country", &payload.country),
    ];

    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| !matches!(value, Some(v) if !v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Missing required address fields: {}",
            missing.join(", ")
        )));
    }

    // All fields verified present above
    let unwrap_field = |value: Option<String>| value.unwrap_or_default().trim().to_string();
    Ok(Address {
        street: unwrap_field(payload.street),
        city: unwrap_field(payload.city),
        state: unwrap_field(payload.state),
        postal_code: unwrap_field(payload.postal_code),
        country: unwrap_field(payload.country),
    })
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/api/auth/register
/// Content-Type: application/json
///
/// { "name": "Jane Doe", "email": "jane@example.com", "password": "..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    let address = req.address.map(complete_address).transpose()?;

    if state
        .store
        .find_user_by_email(&req.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password(&req.password)?;

    let user = state
        .store
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            phone: req.phone,
            address,
            role: req.role.unwrap_or_default(),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created".to_string(),
            user_id: user.id.to_hex(),
            role: user.role,
        }),
    ))
}

/// Login and obtain a bearer token
///
/// # Endpoint
///
/// ```text
/// POST /v1/api/auth/login
/// Content-Type: application/json
///
/// { "email": "jane@example.com", "password": "..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: unknown email or wrong password
/// - `403 Forbidden`: admin login requested without the admin role
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    // Admin console logins assert the admin role up front
    if req.role == Some(Role::Admin) && user.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "Access denied. Admin privileges required.".to_string(),
        ));
    }

    let claims = Claims::new(user.id, &user.email, user.role);
    let token = create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "login successful");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}

/// Current user's profile
///
/// # Endpoint
///
/// ```text
/// GET /v1/api/auth/profile
/// Authorization: Bearer <token>
/// ```
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state
        .store
        .find_user(current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Update the current user's profile
///
/// The email address cannot be changed. Supplying an address requires all
/// five address fields.
///
/// # Endpoint
///
/// ```text
/// PUT /v1/api/auth/profile
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "name": "Jane Doe", "phone": "...", "address": { ... } }
/// ```
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UpdateProfileResponse>> {
    req.validate()?;

    let address = req.address.map(complete_address).transpose()?;

    let updated = state
        .store
        .update_profile(
            current.id,
            ProfileUpdate {
                name: req.name.trim().to_string(),
                phone: req.phone.map(|p| p.trim().to_string()),
                address,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %updated.id, "profile updated");

    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".to_string(),
        profile: updated.into(),
    }))
}
