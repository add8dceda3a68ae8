//! Client-side stores over the storefront API.
//!
//! Reads go through a tag-invalidated [`cache::QueryCache`]; mutations go
//! straight to the server and, once confirmed, invalidate the tags they touch
//! so the next read refetches. Nothing is applied locally ahead of the server.

pub mod cache;
mod cart;
mod catalog;

pub use cache::{QueryKey, QueryStatus};
pub use cart::CartReconciler;
pub use catalog::CatalogStore;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::ApiError;
use crate::{MutationKind, Result, StorefrontError};

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool { self(prompt) }
}

/// Proof that a destructive action was approved. Deleting a product and
/// clearing the cart take one of these.
#[derive(Debug)]
pub struct Confirmed {
    _private: (),
}

impl Confirmed {
    pub fn ask(confirm: &impl Confirm, prompt: &str) -> Option<Self> {
        if confirm.confirm(prompt) {
            Some(Self { _private: () })
        } else {
            tracing::info!(prompt, "destructive action declined");
            None
        }
    }

    /// Approval given up front, e.g. a `--yes` flag.
    pub fn pre_approved() -> Self { Self { _private: () } }
}

/// Advisory busy indicator, raised while a mutation of one kind is pending.
#[derive(Debug, Default)]
pub(crate) struct BusyFlag(AtomicUsize);

impl BusyFlag {
    pub(crate) fn is_set(&self) -> bool { self.0.load(Ordering::Acquire) > 0 }

    fn enter(&self) -> BusyGuard<'_> {
        self.0.fetch_add(1, Ordering::AcqRel);
        BusyGuard(&self.0)
    }
}

struct BusyGuard<'a>(&'a AtomicUsize);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) { self.0.fetch_sub(1, Ordering::AcqRel); }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs one server write with its busy flag raised for the duration.
pub(crate) async fn run_mutation<T, Fut>(kind: MutationKind, flag: &BusyFlag, request: Fut) -> Result<T>
where
    Fut: Future<Output = std::result::Result<T, ApiError>>,
{
    let _busy = flag.enter();
    request.await.map_err(|source| {
        tracing::error!(%kind, error = %source, "mutation failed");
        StorefrontError::Mutation { kind, source }
    })
}
