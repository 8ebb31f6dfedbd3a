/// Cart aggregate operations
///
/// All cart mutations go through [`CartService`], which receives its store
/// handle at construction. Each operation independently fetches the user's
/// cart, mutates it, and persists the result; concurrent requests for the
/// same user race with last-write-wins semantics, which is accepted.
///
/// Reading the cart reconciles orphaned lines: any line whose product no
/// longer resolves is filtered out and the cleaned list is persisted before
/// the cart is returned.
use std::sync::Arc;

use bson::oid::ObjectId;

use crate::models::{Cart, CartItem, Product};
use crate::store::{Store, StoreError, StoreResult};

/// Error type for cart operations
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The referenced product does not exist
    #[error("Product not found")]
    ProductNotFound,

    /// The user has no cart yet
    #[error("Cart not found")]
    CartNotFound,

    /// The cart has no line for the referenced product
    #[error("Item not found in cart")]
    ItemNotFound,

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A cart line with its product resolved against the catalog
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub product: Product,
    pub quantity: u32,
}

/// A user's cart as returned by reads: lines resolved, orphans pruned
///
/// `id` is `None` when the user has no cart document yet; the items list is
/// empty rather than the read failing.
#[derive(Debug, Clone)]
pub struct CartView {
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub items: Vec<ResolvedLine>,
}

/// Cart aggregate service
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn Store>,
}

impl CartService {
    /// Creates a cart service over the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Adds `quantity` of a product to the user's cart
    ///
    /// The product must exist. The cart is created lazily on the first item;
    /// if the product is already in the cart the quantities are merged,
    /// otherwise a new line is appended.
    pub async fn add_item(
        &self,
        user: ObjectId,
        product_id: ObjectId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        self.store
            .find_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        match self.store.find_cart_by_user(user).await? {
            Some(mut cart) => {
                cart.merge_line(product_id, quantity);
                self.store.save_cart_items(cart.id, &cart.items).await?;
                Ok(cart)
            }
            None => {
                let mut cart = Cart::new(user);
                cart.merge_line(product_id, quantity);
                Ok(self.store.create_cart(cart).await?)
            }
        }
    }

    /// Overwrites the quantity of an existing cart line
    ///
    /// A quantity of zero or less removes the line. Fails when the product
    /// does not exist, the user has no cart, or the line is absent.
    pub async fn set_item_quantity(
        &self,
        user: ObjectId,
        product_id: ObjectId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        self.store
            .find_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        let mut cart = self
            .store
            .find_cart_by_user(user)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let quantity = quantity.max(0) as u32;
        if !cart.set_line(&product_id, quantity) {
            return Err(CartError::ItemNotFound);
        }

        self.store.save_cart_items(cart.id, &cart.items).await?;
        Ok(cart)
    }

    /// Removes a cart line
    ///
    /// Fails with [`CartError::CartNotFound`] when the user has no cart and
    /// [`CartError::ItemNotFound`] when the line is absent.
    pub async fn remove_item(&self, user: ObjectId, product_id: ObjectId) -> Result<Cart, CartError> {
        let mut cart = self
            .store
            .find_cart_by_user(user)
            .await?
            .ok_or(CartError::CartNotFound)?;

        if !cart.remove_line(&product_id) {
            return Err(CartError::ItemNotFound);
        }

        self.store.save_cart_items(cart.id, &cart.items).await?;
        Ok(cart)
    }

    /// Empties the user's cart
    ///
    /// Idempotent at the cart level: clearing a missing cart creates an
    /// empty one, so the caller always gets a valid cart back.
    pub async fn clear(&self, user: ObjectId) -> Result<Cart, CartError> {
        match self.store.find_cart_by_user(user).await? {
            Some(mut cart) => {
                cart.items.clear();
                self.store.save_cart_items(cart.id, &cart.items).await?;
                Ok(cart)
            }
            None => Ok(self.store.create_cart(Cart::new(user)).await?),
        }
    }

    /// Reads the user's cart with lines resolved against the catalog
    ///
    /// Orphaned lines (product deleted since the line was added) are
    /// filtered out and the cleaned item list is persisted before the view
    /// is returned. A user without a cart gets an empty view.
    pub async fn get_cart(&self, user: ObjectId) -> Result<CartView, CartError> {
        let Some(cart) = self.store.find_cart_by_user(user).await? else {
            return Ok(CartView {
                id: None,
                user,
                items: Vec::new(),
            });
        };

        let resolved = self.resolve(&cart).await?;

        if resolved.len() != cart.items.len() {
            let cleaned: Vec<CartItem> = resolved
                .iter()
                .map(|line| CartItem {
                    product: line.product.id,
                    quantity: line.quantity,
                })
                .collect();
            self.store.save_cart_items(cart.id, &cleaned).await?;
        }

        Ok(CartView {
            id: Some(cart.id),
            user: cart.user,
            items: resolved,
        })
    }

    /// Resolves a cart's lines against the catalog, dropping orphans
    ///
    /// Does not persist anything; used by reads (which persist the cleaned
    /// list themselves) and by checkout pricing.
    pub async fn resolve(&self, cart: &Cart) -> StoreResult<Vec<ResolvedLine>> {
        let mut resolved = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            if let Some(product) = self.store.find_product(item.product).await? {
                resolved.push(ResolvedLine {
                    product,
                    quantity: item.quantity,
                });
            }
        }
        Ok(resolved)
    }
}
