//! Storage boundary of the catalog core
//!
//! Collaborator traits for categories, lookups and listings, a process-local
//! implementation of all three, and the JSON snapshot it is loaded from.

mod memory_store;
mod snapshot;
mod traits;

use std::future::Future;
use std::time::Duration;

use crate::core::error::{AppError, Result};

pub use memory_store::InMemoryCatalogStore;
pub use snapshot::CatalogSnapshot;
pub use traits::{CategoryStore, ListingStore, LookupStore};

/// Bound a store call; an elapsed timer surfaces as `AppError::Store`
pub async fn with_timeout<T>(timeout: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(timeout, fut).await.map_err(|_| {
        tracing::error!("Store call timed out after {:?}", timeout);
        AppError::Store("Store call timed out".to_string())
    })?
}
