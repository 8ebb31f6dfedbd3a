/// Document store seam
///
/// The persistence engine is an external collaborator: everything the
/// storefront needs from it is expressed as find/create/update/delete
/// operations on four collections (users, products, carts, orders). The
/// `Store` trait captures that contract so the cart and checkout
/// orchestrators receive a store handle at construction instead of reaching
/// for a global client.
///
/// Implementations:
/// - [`MongoStore`]: MongoDB-backed production store
/// - [`MemoryStore`]: in-process store for tests and local experimentation
pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::models::{
    Cart, CartItem, NewOrder, NewProduct, NewUser, Order, Product, ProductUpdate, ProfileUpdate,
    User,
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint was violated (e.g. duplicate user email)
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// Underlying database driver failure
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Failed to serialize a value into a document
    #[error("serialization error: {0}")]
    Serialize(#[from] bson::ser::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store contract
///
/// Every operation fetches or persists a whole aggregate; there is no
/// locking discipline, and concurrent writers to the same document race with
/// last-write-wins semantics at the persistence layer.
#[async_trait]
pub trait Store: Send + Sync {
    /// Verifies store connectivity (used by the health endpoint)
    async fn ping(&self) -> StoreResult<()>;

    // --- users ---

    /// Creates a user; fails with [`StoreError::Duplicate`] when the email
    /// is already registered
    async fn create_user(&self, data: NewUser) -> StoreResult<User>;

    /// Finds a user by id
    async fn find_user(&self, id: ObjectId) -> StoreResult<Option<User>>;

    /// Finds a user by email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Applies a profile update; returns the updated user, or `None` when
    /// the user no longer exists. The email is never modified.
    async fn update_profile(&self, id: ObjectId, update: ProfileUpdate)
        -> StoreResult<Option<User>>;

    // --- products ---

    /// Lists the whole catalog
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// Finds a product by id
    async fn find_product(&self, id: ObjectId) -> StoreResult<Option<Product>>;

    /// Creates a product
    async fn create_product(&self, data: NewProduct) -> StoreResult<Product>;

    /// Applies a field-wise product update; `None` when the product is gone
    async fn update_product(
        &self,
        id: ObjectId,
        update: ProductUpdate,
    ) -> StoreResult<Option<Product>>;

    /// Deletes a product; returns whether a document was removed
    async fn delete_product(&self, id: ObjectId) -> StoreResult<bool>;

    // --- carts ---

    /// Finds the cart owned by a user
    async fn find_cart_by_user(&self, user: ObjectId) -> StoreResult<Option<Cart>>;

    /// Finds a cart by id
    async fn find_cart(&self, id: ObjectId) -> StoreResult<Option<Cart>>;

    /// Inserts a new cart document
    async fn create_cart(&self, cart: Cart) -> StoreResult<Cart>;

    /// Replaces a cart's line items, bumping its update timestamp
    async fn save_cart_items(&self, id: ObjectId, items: &[CartItem]) -> StoreResult<()>;

    // --- orders ---

    /// Materializes an order snapshot
    async fn create_order(&self, data: NewOrder) -> StoreResult<Order>;
}
