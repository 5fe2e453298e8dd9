use std::sync::Arc;

use models::{Collection, Record};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::errors::ServiceError;
use crate::storage::backend::{KeyValueBackend, MemoryBackend};

/// Merge `patch` into the record with `id` and refresh its `updated_at`.
/// Returns the updated record, or `None` (leaving `records` untouched) when absent.
pub fn update_in<R, F>(records: &mut [R], id: &str, patch: F) -> Option<R>
where
    R: Record,
    F: FnOnce(&mut R),
{
    let record = records.iter_mut().find(|r| r.id() == id)?;
    patch(record);
    record.touch();
    Some(record.clone())
}

/// Local persistence for the bookings and payments collections.
///
/// Each collection is a JSON array stored under a fixed key. Read-modify-write
/// sequences on a collection hold that collection's lock, so overlapping
/// intercepted calls cannot lose each other's writes.
pub struct RecordStore {
    backend: Arc<dyn KeyValueBackend>,
    bookings_lock: Mutex<()>,
    payments_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend, bookings_lock: Mutex::new(()), payments_lock: Mutex::new(()) }
    }

    /// Store over a fresh process-local backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    async fn lock(&self, collection: Collection) -> MutexGuard<'_, ()> {
        match collection {
            Collection::Bookings => self.bookings_lock.lock().await,
            Collection::Payments => self.payments_lock.lock().await,
        }
    }

    /// Raw persisted text of a collection, if it was ever written.
    pub async fn read_raw(&self, collection: Collection) -> Option<String> {
        match self.backend.get(collection.storage_key()).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%collection, error = %e, "cannot read collection; treating as empty");
                None
            }
        }
    }

    async fn load<R: Record>(&self) -> Vec<R> {
        let collection = R::COLLECTION;
        match self.load_strict::<R>().await {
            Ok(records) => records,
            Err(e) => {
                warn!(%collection, error = %e, "cannot load collection; treating as empty");
                Vec::new()
            }
        }
    }

    /// Load for a read-modify-write. Unlike [`Self::read_all`] this fails on
    /// unreadable or unparseable data, so a following write cannot replace
    /// records it could not see.
    async fn load_strict<R: Record>(&self) -> Result<Vec<R>, ServiceError> {
        let collection = R::COLLECTION;
        let Some(raw) = self.backend.get(collection.storage_key()).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|e| {
            ServiceError::Serialization(format!("stored {collection} collection is not parseable: {e}"))
        })
    }

    async fn persist<R: Record>(&self, records: &[R]) -> Result<(), ServiceError> {
        let collection = R::COLLECTION;
        let data = serde_json::to_string(records).map_err(|e| ServiceError::Serialization(e.to_string()))?;
        self.backend.set(collection.storage_key(), data).await?;
        debug!(%collection, count = records.len(), "collection persisted");
        Ok(())
    }

    /// Every record of `R`'s collection; empty if nothing was stored yet. Never fails.
    pub async fn read_all<R: Record>(&self) -> Vec<R> {
        self.load().await
    }

    /// Replace the whole collection in a single backend write.
    pub async fn write_all<R: Record>(&self, records: &[R]) -> Result<(), ServiceError> {
        let _guard = self.lock(R::COLLECTION).await;
        self.persist(records).await
    }

    pub async fn find_by_id<R: Record>(&self, id: &str) -> Option<R> {
        self.load::<R>().await.into_iter().find(|r| r.id() == id)
    }

    /// Apply `patch` to the record with `id`, refresh `updated_at` and persist.
    /// Returns `Ok(None)` without writing anything when no record has that id.
    pub async fn update_by_id<R, F>(&self, id: &str, patch: F) -> Result<Option<R>, ServiceError>
    where
        R: Record,
        F: FnOnce(&mut R) + Send,
    {
        let _guard = self.lock(R::COLLECTION).await;
        let mut records = self.load_strict::<R>().await?;
        let Some(updated) = update_in(&mut records, id, patch) else {
            return Ok(None);
        };
        self.persist(&records).await?;
        Ok(Some(updated))
    }

    /// Run `f` over a snapshot of the collection while holding its lock.
    /// `f` returns the replacement snapshot (or `None` to leave storage
    /// untouched) together with a value handed back to the caller.
    pub async fn transact<R, T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        R: Record,
        T: Send,
        F: FnOnce(Vec<R>) -> Result<(Option<Vec<R>>, T), ServiceError> + Send,
    {
        let _guard = self.lock(R::COLLECTION).await;
        let snapshot = self.load_strict::<R>().await?;
        let (next, out) = f(snapshot)?;
        if let Some(next) = next {
            self.persist(&next).await?;
        }
        Ok(out)
    }
}
