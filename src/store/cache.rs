//! Read-through query cache keyed by request shape.
//!
//! Every stored value carries the generation of the fetch that produced it.
//! Writes are last-writer-wins by completion order: a slow, older fetch that
//! resolves after a newer one replaces it. Callers that need strict ordering
//! compare generations. An invalidation also covers fetches still in flight:
//! a value requested before the invalidation is stored already stale.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use crate::api::ApiError;
use crate::domain::events::CacheTag;
use crate::domain::value_objects::ProductId;
use crate::store::lock;

/// Shape of a cached read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Products,
    Product(ProductId),
    Cart,
}

impl QueryKey {
    pub fn provides(&self) -> CacheTag {
        match self {
            QueryKey::Products => CacheTag::Product(None),
            QueryKey::Product(id) => CacheTag::Product(Some(*id)),
            QueryKey::Cart => CacheTag::Cart,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never requested.
    Idle,
    Loading,
    Ready,
    /// The last completed request failed. Earlier data, if any, is kept.
    Failed(ApiError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cached<V> {
    pub value: V,
    pub generation: u64,
}

#[derive(Debug)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    generation: u64,
    stale: bool,
}

#[derive(Debug)]
struct Slot<V> {
    entry: Option<Entry<V>>,
    in_flight: usize,
    last_error: Option<ApiError>,
    /// Fetches with a generation below this began before the last invalidation.
    invalidated_before: u64,
}

impl<V> Default for Slot<V> {
    fn default() -> Self { Self { entry: None, in_flight: 0, last_error: None, invalidated_before: 0 } }
}

#[derive(Debug)]
pub struct QueryCache<V> {
    slots: HashMap<QueryKey, Slot<V>>,
    next_generation: u64,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self { Self { slots: HashMap::new(), next_generation: 1 } }
}

impl<V: Clone> QueryCache<V> {
    /// Cached value that has not been invalidated since it was stored.
    pub fn fresh(&self, key: &QueryKey) -> Option<Cached<V>> {
        self.slots
            .get(key)
            .and_then(|s| s.entry.as_ref())
            .filter(|e| !e.stale)
            .map(|e| Cached { value: e.value.clone(), generation: e.generation })
    }

    /// Value from the most recently completed fetch, stale or not.
    pub fn latest(&self, key: &QueryKey) -> Option<Cached<V>> {
        self.slots
            .get(key)
            .and_then(|s| s.entry.as_ref())
            .map(|e| Cached { value: e.value.clone(), generation: e.generation })
    }
}

impl<V> QueryCache<V> {
    pub fn begin(&mut self, key: QueryKey) -> FetchTicket {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.slots.entry(key).or_default().in_flight += 1;
        FetchTicket { key, generation }
    }

    /// Stores a fetched value and returns its generation.
    pub fn complete(&mut self, ticket: FetchTicket, value: V) -> u64 {
        let slot = self.slots.entry(ticket.key).or_default();
        slot.in_flight = slot.in_flight.saturating_sub(1);
        slot.last_error = None;
        if let Some(previous) = &slot.entry {
            if previous.generation > ticket.generation {
                tracing::debug!(key = ?ticket.key, older = ticket.generation, newer = previous.generation, "older fetch resolved last and replaces newer data");
            }
        }
        let stale = ticket.generation < slot.invalidated_before;
        if stale {
            tracing::debug!(key = ?ticket.key, generation = ticket.generation, "fetch began before an invalidation, stored as stale");
        }
        slot.entry = Some(Entry { value, generation: ticket.generation, stale });
        ticket.generation
    }

    pub fn fail(&mut self, ticket: FetchTicket, err: &ApiError) {
        let slot = self.slots.entry(ticket.key).or_default();
        slot.in_flight = slot.in_flight.saturating_sub(1);
        slot.last_error = Some(err.clone());
    }

    /// Marks every entry whose tag is covered as stale, along with any fetch
    /// for it still in flight; returns how many stored entries went stale.
    pub fn invalidate(&mut self, tag: CacheTag) -> usize {
        let watermark = self.next_generation;
        let mut count = 0;
        for (key, slot) in self.slots.iter_mut() {
            if !tag.covers(&key.provides()) {
                continue;
            }
            slot.invalidated_before = watermark;
            if let Some(entry) = slot.entry.as_mut() {
                if !entry.stale {
                    entry.stale = true;
                    count += 1;
                }
            }
        }
        count
    }

    pub fn evict(&mut self, key: &QueryKey) {
        if let Some(slot) = self.slots.get_mut(key) {
            slot.entry = None;
        }
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        match self.slots.get(key) {
            None => QueryStatus::Idle,
            Some(slot) if slot.in_flight > 0 => QueryStatus::Loading,
            Some(Slot { last_error: Some(err), .. }) => QueryStatus::Failed(err.clone()),
            Some(Slot { entry: Some(_), .. }) => QueryStatus::Ready,
            Some(_) => QueryStatus::Idle,
        }
    }
}

/// Serves `key` from cache when fresh, otherwise runs `fetch` and stores the result.
pub(crate) async fn read_through<V, F, Fut>(
    cache: &Mutex<QueryCache<V>>,
    key: QueryKey,
    fetch: F,
) -> Result<Cached<V>, ApiError>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, ApiError>>,
{
    let hit = lock(cache).fresh(&key);
    if let Some(hit) = hit {
        tracing::debug!(?key, generation = hit.generation, "cache hit");
        return Ok(hit);
    }

    let ticket = lock(cache).begin(key);
    tracing::debug!(?key, generation = ticket.generation, "fetching");
    match fetch().await {
        Ok(value) => {
            let generation = lock(cache).complete(ticket, value.clone());
            Ok(Cached { value, generation })
        }
        Err(err) => {
            lock(cache).fail(ticket, &err);
            Err(err)
        }
    }
}
