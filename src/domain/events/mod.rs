//! Store events and the cache tags they invalidate
use crate::domain::value_objects::{CartItemId, ProductId};

/// Label a cached read provides. `Product(None)` covers every product entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Product(Option<ProductId>),
    Cart,
}

impl CacheTag {
    /// Whether invalidating `self` invalidates an entry that provides `provided`.
    pub fn covers(&self, provided: &CacheTag) -> bool {
        match (self, provided) {
            (CacheTag::Product(None), CacheTag::Product(_)) => true,
            (CacheTag::Product(Some(a)), CacheTag::Product(Some(b))) => a == b,
            (CacheTag::Cart, CacheTag::Cart) => true,
            _ => false,
        }
    }
}

/// Completed server-side mutation, raised after the server confirms it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    Product(ProductEvent),
    Cart(CartEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductEvent {
    Created { product_id: ProductId },
    Updated { product_id: ProductId },
    Deleted { product_id: ProductId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartEvent {
    LineAdded { item_id: CartItemId },
    LineRemoved { item_id: CartItemId },
    Cleared,
}

impl StoreEvent {
    pub fn invalidates(&self) -> Vec<CacheTag> {
        match self {
            StoreEvent::Product(ProductEvent::Updated { product_id }) => {
                vec![CacheTag::Product(Some(*product_id)), CacheTag::Product(None)]
            }
            StoreEvent::Product(_) => vec![CacheTag::Product(None)],
            StoreEvent::Cart(_) => vec![CacheTag::Cart],
        }
    }
}
