//! Cart Reconciler
//!
//! Wraps the cart endpoints and answers per-product questions (is it in the
//! cart, how many units are reserved, how many can still be added) from the
//! most recently completed cart fetch. A pending mutation never changes those
//! answers; only the refetch that follows its invalidation does.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use validator::Validate;

use crate::api::{ApiError, StorefrontApi};
use crate::domain::aggregates::{AddToCartRequest, CartItem, CartSnapshot, Product, ProductAvailability};
use crate::domain::events::{CartEvent, StoreEvent};
use crate::domain::value_objects::{CartItemId, ProductId};
use crate::store::cache::{read_through, QueryCache, QueryKey, QueryStatus};
use crate::store::{lock, run_mutation, BusyFlag, Confirmed};
use crate::{MutationKind, Result, StorefrontError};

pub struct CartReconciler<A> {
    api: Arc<A>,
    cart: Mutex<QueryCache<CartSnapshot>>,
    adding: BusyFlag,
    removing: BusyFlag,
    clearing: BusyFlag,
}

impl<A: StorefrontApi> CartReconciler<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            cart: Mutex::default(),
            adding: BusyFlag::default(),
            removing: BusyFlag::default(),
            clearing: BusyFlag::default(),
        }
    }

    /// Current cart, fetched unless a fresh copy is cached.
    pub async fn load(&self) -> Result<CartSnapshot> {
        let api = Arc::clone(&self.api);
        let cached = read_through(&self.cart, QueryKey::Cart, || async move {
            let items = api.list_cart().await?;
            CartSnapshot::new(items).map_err(|e| ApiError::Decode(e.to_string()))
        })
        .await
        .map_err(|source| {
            tracing::error!(error = %source, "cart unavailable");
            StorefrontError::Fetch { resource: "cart", source }
        })?;
        tracing::debug!(lines = cached.value.line_count(), generation = cached.generation, "cart loaded");
        Ok(cached.value)
    }

    /// Cart lines in server order.
    pub async fn list_items(&self) -> Result<Vec<CartItem>> {
        self.load().await.map(CartSnapshot::into_items)
    }

    /// Drops the cached cart and fetches it again.
    pub async fn refresh(&self) -> Result<CartSnapshot> {
        lock(&self.cart).invalidate(QueryKey::Cart.provides());
        self.load().await
    }

    /// Lines from the most recent completed fetch; empty before the first.
    pub fn snapshot(&self) -> CartSnapshot {
        lock(&self.cart).latest(&QueryKey::Cart).map(|c| c.value).unwrap_or_default()
    }

    pub fn generation(&self) -> Option<u64> {
        lock(&self.cart).latest(&QueryKey::Cart).map(|c| c.generation)
    }

    pub fn status(&self) -> QueryStatus { lock(&self.cart).status(&QueryKey::Cart) }
    pub fn is_loading(&self) -> bool { self.status() == QueryStatus::Loading }

    pub fn is_adding(&self) -> bool { self.adding.is_set() }
    pub fn is_removing(&self) -> bool { self.removing.is_set() }
    pub fn is_clearing(&self) -> bool { self.clearing.is_set() }

    /// Puts `quantity` units of a product in the cart. Callers check stock
    /// first (see [`CartReconciler::available_quantity`]); the server decides
    /// whether a repeat add merges into the existing line.
    pub async fn add_one(&self, product_id: ProductId, quantity: u32) -> Result<CartItem> {
        let request = AddToCartRequest::new(product_id, quantity);
        request.validate()?;
        let line = run_mutation(MutationKind::AddToCart, &self.adding, self.api.add_to_cart(&request)).await?;
        self.apply(StoreEvent::Cart(CartEvent::LineAdded { item_id: line.id }));
        Ok(line)
    }

    /// Removes the whole line, whatever its quantity.
    pub async fn remove_line(&self, item_id: CartItemId) -> Result<()> {
        run_mutation(MutationKind::RemoveFromCart, &self.removing, self.api.remove_from_cart(item_id)).await?;
        self.apply(StoreEvent::Cart(CartEvent::LineRemoved { item_id }));
        Ok(())
    }

    /// Empties the cart. The server clears all lines or none.
    pub async fn clear(&self, _confirmed: Confirmed) -> Result<()> {
        run_mutation(MutationKind::ClearCart, &self.clearing, self.api.clear_cart()).await?;
        self.apply(StoreEvent::Cart(CartEvent::Cleared));
        Ok(())
    }

    pub fn total(&self) -> Decimal { self.snapshot().total() }
    pub fn items_count(&self) -> u64 { self.snapshot().items_count() }

    pub fn is_product_in_cart(&self, product_id: ProductId) -> bool {
        self.snapshot().is_product_in_cart(product_id)
    }

    pub fn cart_item_id_for(&self, product_id: ProductId) -> Option<CartItemId> {
        self.snapshot().cart_item_id_for(product_id)
    }

    pub fn quantity_in_cart_for(&self, product_id: ProductId) -> u32 {
        self.snapshot().quantity_in_cart_for(product_id)
    }

    pub fn available_quantity(&self, product: &Product) -> u32 {
        self.snapshot().available_quantity(product)
    }

    pub fn availability(&self, product: &Product) -> ProductAvailability {
        self.snapshot().availability(product)
    }

    fn apply(&self, event: StoreEvent) {
        let mut stale = 0;
        for tag in event.invalidates() {
            stale += lock(&self.cart).invalidate(tag);
        }
        tracing::info!(?event, stale, "cart invalidated");
    }
}
