//! Growing visible prefix over an in-memory product list.
//!
//! The full list is fetched once; the window only staggers how much of it is
//! shown. Growth is driven by an external "sentinel visible" signal, the
//! platform's equivalent of an intersection observer on a load-more marker.

use crate::domain::aggregates::ProductFilter;

pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Identifies one concrete list: the fetch that produced it and the filter applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListIdentity {
    pub generation: u64,
    pub filter: ProductFilter,
}

impl ListIdentity {
    pub fn new(generation: u64, filter: ProductFilter) -> Self { Self { generation, filter } }
}

#[derive(Clone, Debug)]
pub struct CatalogWindow {
    page_size: usize,
    visible_count: usize,
    len: usize,
    source: Option<ListIdentity>,
    loading: bool,
}

impl Default for CatalogWindow {
    fn default() -> Self { Self::new(DEFAULT_PAGE_SIZE) }
}

impl CatalogWindow {
    /// A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self { page_size: page_size.max(1), visible_count: 0, len: 0, source: None, loading: false }
    }

    /// Points the window at `source`. A different list than before restarts
    /// the window from its first page; returns whether that happened.
    pub fn sync(&mut self, source: ListIdentity, len: usize) -> bool {
        if self.source.as_ref() == Some(&source) {
            return false;
        }
        tracing::debug!(generation = source.generation, len, "catalog window reset");
        self.source = Some(source);
        self.reset(len);
        true
    }

    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.visible_count = self.page_size.min(len);
    }

    /// While the source list is loading, sentinel signals are ignored.
    pub fn set_loading(&mut self, loading: bool) { self.loading = loading; }

    /// Reveals one more page. Returns `false` when nothing changed.
    pub fn on_sentinel_visible(&mut self) -> bool {
        if self.loading || self.is_fully_loaded() {
            return false;
        }
        self.visible_count = self.visible_count.saturating_add(self.page_size).min(self.len);
        true
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.visible_count.min(items.len());
        &items[..end]
    }

    pub fn page_size(&self) -> usize { self.page_size }
    pub fn visible_count(&self) -> usize { self.visible_count }
    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn remaining(&self) -> usize { self.len - self.visible_count }

    /// Everything is shown; the load-more sentinel can be dropped.
    pub fn is_fully_loaded(&self) -> bool { self.visible_count >= self.len }
}
