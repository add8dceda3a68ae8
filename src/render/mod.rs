//! Incremental rendering of the fetched catalog
mod window;

pub use window::{CatalogWindow, ListIdentity, DEFAULT_PAGE_SIZE};
