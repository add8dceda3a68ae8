//! Cart Aggregate
//!
//! The cart is never stored as its own record. [`CartSnapshot`] holds the
//! lines from the most recent completed fetch and every figure on it (totals,
//! reserved and available quantities) is recomputed from those lines on each
//! call.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;
use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::{CartItemId, ProductId, Quantity};

/// One cart line, carrying the product snapshot it was served with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: Quantity,
    #[serde(deserialize_with = "utc_or_naive")]
    pub created_at: DateTime<Utc>,
}

/// RFC 3339, or a timestamp without offset (as a SQL `TIMESTAMP` column
/// serializes), read as UTC.
fn utc_or_naive<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| serde::de::Error::custom(format!("invalid createdAt '{raw}': {e}")))
}

impl CartItem {
    pub fn product_id(&self) -> ProductId { self.product.id }
    pub fn line_total(&self) -> Decimal { self.product.price.times(self.quantity.value()) }
}

/// Body of `POST /api/cart`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

impl AddToCartRequest {
    pub fn new(product_id: ProductId, quantity: u32) -> Self { Self { product_id, quantity } }
}

/// Cart lines from one completed fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartSnapshot {
    items: Vec<CartItem>,
}

impl CartSnapshot {
    /// Lines with a zero quantity are rejected; a cart line always holds at least one unit.
    pub fn new(items: Vec<CartItem>) -> Result<Self, CartError> {
        if let Some(empty) = items.iter().find(|i| i.quantity.is_zero()) {
            return Err(CartError::EmptyLine(empty.id));
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn into_items(self) -> Vec<CartItem> { self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn line_count(&self) -> usize { self.items.len() }

    /// Σ quantity over all lines.
    pub fn items_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity.value())).sum()
    }

    /// Σ price × quantity over all lines, saturating at `Decimal::MAX`.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, |acc, t| acc.checked_add(t).unwrap_or(Decimal::MAX))
    }

    pub fn line_for(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    pub fn is_product_in_cart(&self, product_id: ProductId) -> bool {
        self.line_for(product_id).is_some()
    }

    pub fn cart_item_id_for(&self, product_id: ProductId) -> Option<CartItemId> {
        self.line_for(product_id).map(|i| i.id)
    }

    /// Units of `product_id` reserved by this cart. Sums every line holding
    /// the product, so a server that splits one product across lines still
    /// reserves the right amount.
    pub fn quantity_in_cart_for(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .filter(|i| i.product_id() == product_id)
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity.value()))
    }

    /// `max(0, stock - reserved)`, using the stock count on the given product record.
    pub fn available_quantity(&self, product: &Product) -> u32 {
        product.quantity.saturating_sub(self.quantity_in_cart_for(product.id)).value()
    }

    pub fn can_add_one(&self, product: &Product) -> bool { self.available_quantity(product) > 0 }

    pub fn availability(&self, product: &Product) -> ProductAvailability {
        let reserved = self.quantity_in_cart_for(product.id);
        ProductAvailability {
            product_id: product.id,
            in_cart: self.is_product_in_cart(product.id),
            cart_item_id: self.cart_item_id_for(product.id),
            reserved,
            available: product.quantity.saturating_sub(reserved).value(),
        }
    }
}

/// Per-product figures a product card or detail view renders from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProductAvailability {
    pub product_id: ProductId,
    pub in_cart: bool,
    pub cart_item_id: Option<CartItemId>,
    pub reserved: u32,
    pub available: u32,
}

impl ProductAvailability {
    /// Every remaining unit is already in the cart.
    pub fn is_maxed_out(&self) -> bool { self.in_cart && self.available == 0 }
}

/// Quantity a user may request on a detail view: at least one, at most what
/// is still available. Yields zero when nothing is available.
pub fn clamp_requested_quantity(requested: u32, available: u32) -> u32 {
    requested.max(1).min(available)
}

/// Products and cart lines as of the latest completed fetches. Views rebuild
/// derived figures from this whenever either half changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StorefrontSnapshot {
    pub products: Vec<Product>,
    pub cart: CartSnapshot,
}

impl StorefrontSnapshot {
    pub fn new(products: Vec<Product>, cart: CartSnapshot) -> Self { Self { products, cart } }

    pub fn product_views(&self) -> impl Iterator<Item = (&Product, ProductAvailability)> + '_ {
        self.products.iter().map(|p| (p, self.cart.availability(p)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { EmptyLine(CartItemId) }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::EmptyLine(id) => write!(f, "cart line {id} has zero quantity") }
    }
}
