//! In-memory API double for store tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Notify;

use super::{ApiError, StorefrontApi};
use crate::domain::aggregates::{AddToCartRequest, CartItem, CreateProductRequest, Product};
use crate::domain::value_objects::{CartItemId, Price, ProductId, Quantity};

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    cart: Vec<CartItem>,
    next_product_id: u64,
    next_item_id: u64,
    line_per_add: bool,
    fail_next: Option<ApiError>,
    calls: HashMap<&'static str, usize>,
    cart_gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

pub(crate) fn product(id: u64, price: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: "Description long enough".into(),
        price: Price::new(Decimal::new(price, 0)).unwrap(),
        category: "General".into(),
        quantity: Quantity::new(stock),
        image_url: None,
    }
}

impl FakeApi {
    pub(crate) fn with_products(products: Vec<Product>) -> Self {
        let next = products.iter().map(|p| p.id.value()).max().unwrap_or(0) + 1;
        let api = Self::default();
        {
            let mut s = api.state.lock().unwrap();
            s.products = products;
            s.next_product_id = next;
            s.next_item_id = 100;
        }
        api
    }

    /// Every add creates a fresh line instead of merging into an existing one.
    pub(crate) fn line_per_add(self) -> Self {
        self.state.lock().unwrap().line_per_add = true;
        self
    }

    pub(crate) fn fail_next(&self, err: ApiError) {
        self.state.lock().unwrap().fail_next = Some(err);
    }

    pub(crate) fn calls(&self, endpoint: &'static str) -> usize {
        self.state.lock().unwrap().calls.get(endpoint).copied().unwrap_or(0)
    }

    pub(crate) fn set_stock(&self, id: u64, stock: u32) {
        let mut s = self.state.lock().unwrap();
        if let Some(p) = s.products.iter_mut().find(|p| p.id.value() == id) {
            p.quantity = Quantity::new(stock);
        }
    }

    /// The next cart read takes its lines, signals the first handle and then
    /// waits on the second before returning them.
    pub(crate) fn gate_next_cart_read(&self) -> (Arc<Notify>, Arc<Notify>) {
        let parked = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        self.state.lock().unwrap().cart_gate = Some((Arc::clone(&parked), Arc::clone(&release)));
        (parked, release)
    }

    fn enter(&self, endpoint: &'static str) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut s = self.state.lock().unwrap();
        *s.calls.entry(endpoint).or_default() += 1;
        match s.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(s),
        }
    }
}

#[async_trait]
impl StorefrontApi for FakeApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        Ok(self.enter("list_products")?.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let s = self.enter("get_product")?;
        s.products.iter().find(|p| p.id == id).cloned().ok_or(ApiError::NotFound)
    }

    async fn create_product(&self, request: &CreateProductRequest) -> Result<Product, ApiError> {
        let mut s = self.enter("create_product")?;
        let id = ProductId::new(s.next_product_id);
        s.next_product_id += 1;
        let mut product = product(id.value(), 0, 0);
        product.apply(request.clone());
        s.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> Result<Product, ApiError> {
        let mut s = self.enter("update_product")?;
        let slot = s.products.iter_mut().find(|p| p.id == product.id).ok_or(ApiError::NotFound)?;
        *slot = product.clone();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        let mut s = self.enter("delete_product")?;
        let before = s.products.len();
        s.products.retain(|p| p.id != id);
        if s.products.len() == before { return Err(ApiError::NotFound); }
        Ok(())
    }

    async fn list_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let (lines, gate) = {
            let mut s = self.enter("list_cart")?;
            // lines carry the current product record, as the server joins them
            let lines: Vec<CartItem> = s
                .cart
                .iter()
                .map(|line| {
                    let mut line = line.clone();
                    if let Some(p) = s.products.iter().find(|p| p.id == line.product.id) {
                        line.product = p.clone();
                    }
                    line
                })
                .collect();
            (lines, s.cart_gate.take())
        };
        if let Some((parked, release)) = gate {
            parked.notify_one();
            release.notified().await;
        }
        Ok(lines)
    }

    async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<CartItem, ApiError> {
        let mut s = self.enter("add_to_cart")?;
        let product = s
            .products
            .iter()
            .find(|p| p.id == request.product_id)
            .cloned()
            .ok_or(ApiError::NotFound)?;
        if !s.line_per_add {
            if let Some(line) = s.cart.iter_mut().find(|l| l.product.id == request.product_id) {
                line.quantity = line.quantity.add(request.quantity);
                return Ok(line.clone());
            }
        }
        let line = CartItem {
            id: CartItemId::new(s.next_item_id),
            product,
            quantity: Quantity::new(request.quantity),
            created_at: Utc::now(),
        };
        s.next_item_id += 1;
        s.cart.push(line.clone());
        Ok(line)
    }

    async fn remove_from_cart(&self, id: CartItemId) -> Result<(), ApiError> {
        let mut s = self.enter("remove_from_cart")?;
        let before = s.cart.len();
        s.cart.retain(|l| l.id != id);
        if s.cart.len() == before { return Err(ApiError::NotFound); }
        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        self.enter("clear_cart")?.cart.clear();
        Ok(())
    }
}
