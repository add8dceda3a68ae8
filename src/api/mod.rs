//! Transport seam to the storefront REST API.
//!
//! Stores are generic over [`StorefrontApi`] so the same cart and catalog
//! logic runs against [`HttpApi`] or an in-memory double in tests.

mod http;
#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpApi;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregates::{AddToCartRequest, CartItem, CreateProductRequest, Product};
use crate::domain::value_objects::{CartItemId, ProductId};

/// Endpoints under the `/api` base path.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// `GET /products`
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    /// `GET /products/{id}`
    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError>;
    /// `POST /products`
    async fn create_product(&self, request: &CreateProductRequest) -> Result<Product, ApiError>;
    /// `PUT /products/{id}`
    async fn update_product(&self, product: &Product) -> Result<Product, ApiError>;
    /// `DELETE /products/{id}`
    async fn delete_product(&self, id: ProductId) -> Result<(), ApiError>;
    /// `GET /cart`
    async fn list_cart(&self) -> Result<Vec<CartItem>, ApiError>;
    /// `POST /cart`
    async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<CartItem, ApiError>;
    /// `DELETE /cart/{itemId}`
    async fn remove_from_cart(&self, id: CartItemId) -> Result<(), ApiError>;
    /// `DELETE /cart/clear`
    async fn clear_cart(&self) -> Result<(), ApiError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,

    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool { matches!(self, ApiError::NotFound) }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status { status: status.as_u16(), body: err.to_string() }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
