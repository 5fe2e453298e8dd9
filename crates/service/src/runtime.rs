//! Runtime wiring helpers
//!
//! Builds the record store described by the `[storage]` config section.

use std::sync::Arc;

use configs::{StorageConfig, StorageKind};
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::{FileBackend, KeyValueBackend, MemoryBackend, RecordStore};

/// Open the record store selected by `cfg`. The host owns the returned store
/// and hands it to every fallback client that should share it.
pub async fn open_record_store(cfg: &StorageConfig) -> Result<Arc<RecordStore>, ServiceError> {
    let backend: Arc<dyn KeyValueBackend> = match cfg.kind {
        StorageKind::Memory => {
            info!(quota = ?cfg.quota_bytes, "using in-memory record store");
            match cfg.quota_bytes {
                Some(q) => Arc::new(MemoryBackend::with_quota(q)),
                None => Arc::new(MemoryBackend::new()),
            }
        }
        StorageKind::File => {
            info!(data_dir = %cfg.data_dir.display(), quota = ?cfg.quota_bytes, "using file record store");
            Arc::new(FileBackend::new(&cfg.data_dir, cfg.quota_bytes).await?)
        }
    };
    Ok(Arc::new(RecordStore::new(backend)))
}
