/// In-memory store
///
/// Implements [`Store`] over process-local hash maps. Used by the test
/// suites (unit and router-level) and handy for running the server without a
/// MongoDB instance. Enforces the same unique constraints as the production
/// store so duplicate-email and one-cart-per-user behavior can be exercised
/// without a database.
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bson::oid::ObjectId;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    Cart, CartItem, NewOrder, NewProduct, NewUser, Order, Product, ProductUpdate, ProfileUpdate,
    User,
};

#[derive(Default)]
struct Collections {
    users: HashMap<ObjectId, User>,
    products: HashMap<ObjectId, Product>,
    carts: HashMap<ObjectId, Cart>,
    orders: HashMap<ObjectId, Order>,
}

/// Process-local store for tests and local runs
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        // A poisoned lock only means a test thread panicked mid-write;
        // recover the data rather than cascading the panic.
        self.inner.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Number of stored orders (test helper)
    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    /// All stored orders (test helper)
    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.values().cloned().collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::Duplicate(format!("email {}", data.email)));
        }
        let user = User::new(data);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: ObjectId) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: ObjectId,
        update: ProfileUpdate,
    ) -> StoreResult<Option<User>> {
        let mut inner = self.lock();
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        user.apply_profile(update);
        Ok(Some(user.clone()))
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let mut products: Vec<Product> = self.lock().products.values().cloned().collect();
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    async fn find_product(&self, id: ObjectId) -> StoreResult<Option<Product>> {
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn create_product(&self, data: NewProduct) -> StoreResult<Product> {
        let product = Product::new(data);
        self.lock().products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ObjectId,
        update: ProductUpdate,
    ) -> StoreResult<Option<Product>> {
        let mut inner = self.lock();
        let Some(product) = inner.products.get_mut(&id) else {
            return Ok(None);
        };
        product.apply(update);
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ObjectId) -> StoreResult<bool> {
        Ok(self.lock().products.remove(&id).is_some())
    }

    async fn find_cart_by_user(&self, user: ObjectId) -> StoreResult<Option<Cart>> {
        Ok(self
            .lock()
            .carts
            .values()
            .find(|c| c.user == user)
            .cloned())
    }

    async fn find_cart(&self, id: ObjectId) -> StoreResult<Option<Cart>> {
        Ok(self.lock().carts.get(&id).cloned())
    }

    async fn create_cart(&self, cart: Cart) -> StoreResult<Cart> {
        let mut inner = self.lock();
        if inner.carts.values().any(|c| c.user == cart.user) {
            return Err(StoreError::Duplicate(format!("cart for user {}", cart.user)));
        }
        inner.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn save_cart_items(&self, id: ObjectId, items: &[CartItem]) -> StoreResult<()> {
        let mut inner = self.lock();
        if let Some(cart) = inner.carts.get_mut(&id) {
            cart.items = items.to_vec();
            cart.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn create_order(&self, data: NewOrder) -> StoreResult<Order> {
        let order = Order::new(data);
        self.lock().orders.insert(order.id, order.clone());
        Ok(order)
    }
}
