//! Aggregates module
pub mod product;
pub mod cart;
pub mod catalog;

pub use product::{CreateProductRequest, Product};
pub use cart::{clamp_requested_quantity, AddToCartRequest, CartError, CartItem, CartSnapshot, ProductAvailability, StorefrontSnapshot};
pub use catalog::{CatalogStats, ProductFilter};
