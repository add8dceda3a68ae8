//! reqwest-backed client for the storefront API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::{ApiError, StorefrontApi};
use crate::config::ClientConfig;
use crate::domain::aggregates::{AddToCartRequest, CartItem, CreateProductRequest, Product};
use crate::domain::value_objects::{CartItemId, ProductId};

/// HTTP client bound to one API base URL, e.g. `http://localhost:8080/api`.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    http: Client,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { base_url: config.api_url.trim_end_matches('/').to_string(), http })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "api request");
        self.http.request(method, url)
    }

    async fn expect_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::check(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn expect_empty(response: Response) -> Result<(), ApiError> {
        Self::check(response).await.map(|_| ())
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(response)
    }
}

#[async_trait]
impl StorefrontApi for HttpApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self.request(Method::GET, "/products").send().await?;
        Self::expect_json(response).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let response = self.request(Method::GET, &format!("/products/{id}")).send().await?;
        Self::expect_json(response).await
    }

    async fn create_product(&self, request: &CreateProductRequest) -> Result<Product, ApiError> {
        let response = self.request(Method::POST, "/products").json(request).send().await?;
        Self::expect_json(response).await
    }

    async fn update_product(&self, product: &Product) -> Result<Product, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/products/{}", product.id))
            .json(product)
            .send()
            .await?;
        Self::expect_json(response).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, &format!("/products/{id}")).send().await?;
        Self::expect_empty(response).await
    }

    async fn list_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let response = self.request(Method::GET, "/cart").send().await?;
        Self::expect_json(response).await
    }

    async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<CartItem, ApiError> {
        let response = self.request(Method::POST, "/cart").json(request).send().await?;
        Self::expect_json(response).await
    }

    async fn remove_from_cart(&self, id: CartItemId) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, &format!("/cart/{id}")).send().await?;
        Self::expect_empty(response).await
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, "/cart/clear").send().await?;
        Self::expect_empty(response).await
    }
}
