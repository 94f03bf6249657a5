use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::errors::ForumError;

use super::DocumentStore;

/// Bounds concurrent store use. A request holds one [`PooledStore`] for the whole
/// listing-plus-enrichment sequence; the slot is returned when it is dropped,
/// on success and on error alike.
#[derive(Clone)]
pub struct StorePool {
    store: Arc<dyn DocumentStore>,
    permits: Arc<Semaphore>,
    size: usize,
}

impl std::fmt::Debug for StorePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorePool")
            .field("size", &self.size)
            .field("available", &self.available())
            .finish_non_exhaustive()
    }
}

impl StorePool {
    /// `size` of zero is treated as one.
    pub fn new(store: Arc<dyn DocumentStore>, size: usize) -> Self {
        let size = size.max(1);
        Self { store, permits: Arc::new(Semaphore::new(size)), size }
    }

    /// Waits for a free slot.
    ///
    /// # Errors
    /// Returns `ForumError::PoolClosed` once [`StorePool::close`] has been called.
    pub async fn acquire(&self) -> Result<PooledStore, ForumError> {
        if self.permits.available_permits() == 0 {
            log::debug!("store pool exhausted ({} slots), waiting", self.size);
        }
        let permit = self.permits.clone().acquire_owned().await.map_err(|_| ForumError::PoolClosed)?;
        Ok(PooledStore { store: Arc::clone(&self.store), _permit: permit })
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Rejects further acquisitions. Handles already out stay usable.
    pub fn close(&self) {
        self.permits.close();
    }
}

/// A store handle holding one pool slot.
pub struct PooledStore {
    store: Arc<dyn DocumentStore>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledStore {
    type Target = dyn DocumentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
