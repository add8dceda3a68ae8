//! Storefront Client
//!
//! Typed client for a storefront REST API, plus the client-side state the
//! storefront views render from.
//!
//! ## Features
//! - Product catalog reads with a tag-invalidated read-through cache
//! - Admin create, update and delete of products
//! - Cart reconciliation: totals, reserved and available quantity per product
//! - Incremental rendering window over the fetched catalog

pub mod api;
pub mod config;
pub mod domain;
pub mod render;
pub mod store;

use std::fmt;

use thiserror::Error;

pub use api::{ApiError, HttpApi, StorefrontApi};
pub use config::ClientConfig;
pub use domain::aggregates::{
    clamp_requested_quantity, AddToCartRequest, CartItem, CartSnapshot, CatalogStats, CreateProductRequest,
    Product, ProductAvailability, ProductFilter, StorefrontSnapshot,
};
pub use domain::value_objects::{CartItemId, Price, ProductId, Quantity};
pub use render::{CatalogWindow, ListIdentity};
pub use store::{CartReconciler, CatalogStore, Confirm, Confirmed, QueryStatus};

// =============================================================================
// Error Types
// =============================================================================

/// Server-side write issued by a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    AddToCart,
    RemoveFromCart,
    ClearCart,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateProduct => "create product",
            Self::UpdateProduct => "update product",
            Self::DeleteProduct => "delete product",
            Self::AddToCart => "add to cart",
            Self::RemoveFromCart => "remove from cart",
            Self::ClearCart => "clear cart",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Failed to load {resource}: {source}")]
    Fetch { resource: &'static str, #[source] source: ApiError },

    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("Failed to {kind}: {source}")]
    Mutation { kind: MutationKind, #[source] source: ApiError },

    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorefrontError {
    pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
