/// User model
///
/// Users own at most one cart and any number of orders. Passwords are stored
/// as Argon2id hashes, never in plaintext. The email address is unique
/// (enforced by a unique index on the `users` collection) and immutable after
/// registration: profile updates never touch it.
///
/// # Document shape
///
/// ```json
/// {
///   "_id": ObjectId,
///   "name": "Jane Doe",
///   "email": "jane@example.com",
///   "passwordHash": "$argon2id$...",
///   "phone": "+1 555 0100",
///   "address": { "street": "...", "city": "...", "state": "...",
///                "postalCode": "...", "country": "..." },
///   "role": "user",
///   "createdAt": ISODate,
///   "updatedAt": ISODate
/// }
/// ```
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role granted to a user account
///
/// The role is copied into the JWT at login; catalog mutation requires
/// `Admin`. A role change on the stored user takes effect at the next login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper
    #[default]
    User,

    /// Catalog administrator
    Admin,
}

impl Role {
    /// Gets the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Checks whether the role grants catalog administration
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Shipping address attached to a user profile
///
/// When an address is supplied, all five fields are required; partial
/// addresses are rejected at validation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// User account document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user id
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Display name
    pub name: String,

    /// Email address, unique and immutable after registration
    pub email: String,

    /// Argon2id password hash (PHC string format)
    pub password_hash: String,

    /// Optional phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Optional shipping address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// Account role
    pub role: Role,

    /// When the account was created
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Argon2id hash, not a plaintext password
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub role: Role,
}

/// Profile fields a user may change after registration
///
/// The email is deliberately absent: it cannot be changed. `phone` and
/// `address` replace the stored values; `None` clears them.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

impl User {
    /// Builds a new user document with a fresh id and timestamps
    pub fn new(data: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            phone: data.phone,
            address: data.address,
            role: data.role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a profile update in place, bumping `updated_at`
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        self.name = update.name;
        self.phone = update.phone;
        self.address = update.address;
        self.updated_at = Utc::now();
    }
}
