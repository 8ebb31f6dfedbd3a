/// MongoDB-backed store
///
/// Production implementation of [`Store`] over the `mongodb` driver. Four
/// collections are used: `users`, `products`, `carts`, `orders`. Unique
/// indexes on `users.email` and `carts.user` back the one-account-per-email
/// and one-cart-per-user invariants; violations surface as
/// [`StoreError::Duplicate`].
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson};
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};
use tracing::info;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    Cart, CartItem, NewOrder, NewProduct, NewUser, Order, Product, ProductUpdate, ProfileUpdate,
    User,
};

/// MongoDB store handle
///
/// Cheap to clone; the underlying driver manages its own connection pool.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Wraps an already-connected database handle
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connects to MongoDB and selects the given database
    ///
    /// # Errors
    ///
    /// Returns an error when the connection string is invalid or the server
    /// is unreachable.
    pub async fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        info!(database, "connected to document store");
        Ok(Self { db })
    }

    /// Creates the unique indexes the data model relies on
    ///
    /// Idempotent; safe to run at every startup.
    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        let unique = IndexOptions::builder().unique(true).build();

        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;

        self.carts()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user": 1 })
                    .options(unique)
                    .build(),
                None,
            )
            .await?;

        Ok(())
    }

    fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    fn products(&self) -> Collection<Product> {
        self.db.collection("products")
    }

    fn carts(&self) -> Collection<Cart> {
        self.db.collection("carts")
    }

    fn orders(&self) -> Collection<Order> {
        self.db.collection("orders")
    }
}

/// Checks whether a driver error is a unique index violation (code 11000)
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        let user = User::new(data);
        self.users().insert_one(&user, None).await.map_err(|err| {
            if is_duplicate_key(&err) {
                StoreError::Duplicate(format!("email {}", user.email))
            } else {
                StoreError::Database(err)
            }
        })?;
        Ok(user)
    }

    async fn find_user(&self, id: ObjectId) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    async fn update_profile(
        &self,
        id: ObjectId,
        update: ProfileUpdate,
    ) -> StoreResult<Option<User>> {
        let Some(mut user) = self.find_user(id).await? else {
            return Ok(None);
        };
        user.apply_profile(update);
        self.users()
            .replace_one(doc! { "_id": id }, &user, None)
            .await?;
        Ok(Some(user))
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        use futures::TryStreamExt;

        let cursor = self.products().find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_product(&self, id: ObjectId) -> StoreResult<Option<Product>> {
        Ok(self.products().find_one(doc! { "_id": id }, None).await?)
    }

    async fn create_product(&self, data: NewProduct) -> StoreResult<Product> {
        let product = Product::new(data);
        self.products().insert_one(&product, None).await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ObjectId,
        update: ProductUpdate,
    ) -> StoreResult<Option<Product>> {
        let Some(mut product) = self.find_product(id).await? else {
            return Ok(None);
        };
        product.apply(update);
        self.products()
            .replace_one(doc! { "_id": id }, &product, None)
            .await?;
        Ok(Some(product))
    }

    async fn delete_product(&self, id: ObjectId) -> StoreResult<bool> {
        let result = self.products().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn find_cart_by_user(&self, user: ObjectId) -> StoreResult<Option<Cart>> {
        Ok(self.carts().find_one(doc! { "user": user }, None).await?)
    }

    async fn find_cart(&self, id: ObjectId) -> StoreResult<Option<Cart>> {
        Ok(self.carts().find_one(doc! { "_id": id }, None).await?)
    }

    async fn create_cart(&self, cart: Cart) -> StoreResult<Cart> {
        self.carts().insert_one(&cart, None).await.map_err(|err| {
            if is_duplicate_key(&err) {
                StoreError::Duplicate(format!("cart for user {}", cart.user))
            } else {
                StoreError::Database(err)
            }
        })?;
        Ok(cart)
    }

    async fn save_cart_items(&self, id: ObjectId, items: &[CartItem]) -> StoreResult<()> {
        let items = bson::to_bson(items)?;
        self.carts()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "items": items, "updatedAt": Bson::DateTime(bson::DateTime::now()) } },
                None,
            )
            .await?;
        Ok(())
    }

    async fn create_order(&self, data: NewOrder) -> StoreResult<Order> {
        let order = Order::new(data);
        self.orders().insert_one(&order, None).await?;
        Ok(order)
    }
}
