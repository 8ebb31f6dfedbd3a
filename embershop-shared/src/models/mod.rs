//! Document models persisted to the store.
//!
//! All models serialize with camelCase field names, which is both the wire
//! format the storefront SPA consumes and the document layout in the store.
//! Ids are BSON ObjectIds rendered as 24-character hex strings on the wire.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem};
pub use order::{NewOrder, Order, OrderItem};
pub use product::{NewProduct, Product, ProductUpdate};
pub use user::{Address, NewUser, ProfileUpdate, Role, User};
