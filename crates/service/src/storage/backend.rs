use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// String key-value storage the record store persists into.
/// Implementations can be process-local, file-backed, or remote KV.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError>;
    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError>;
}

fn check_quota(key: &str, quota: Option<usize>, other_usage: usize, value: &str) -> Result<(), ServiceError> {
    if let Some(quota) = quota {
        let needed = other_usage + key.len() + value.len();
        if needed > quota {
            return Err(ServiceError::QuotaExceeded { key: key.to_string(), needed, quota });
        }
    }
    Ok(())
}

/// Volatile in-process storage with an optional byte quota over all keys and values.
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self { inner: RwLock::new(HashMap::new()), quota: Some(quota) }
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        let other_usage: usize = map
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        check_quota(key, self.quota, other_usage, &value)?;
        map.insert(key.to_string(), value);
        Ok(())
    }
}

/// One `<key>.json` file per key under a data directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a reader
/// never observes a half-written collection.
#[derive(Clone)]
pub struct FileBackend {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileBackend {
    /// Open the backend, creating the directory if missing.
    pub async fn new<P: Into<PathBuf>>(dir: P, quota: Option<usize>) -> Result<Self, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| ServiceError::Io(e.to_string()))?;
        Ok(Self { dir, quota })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn usage_excluding(&self, key: &str) -> Result<usize, ServiceError> {
        let own = self.path_for(key);
        let mut total = 0usize;
        let mut entries = fs::read_dir(&self.dir).await.map_err(|e| ServiceError::Io(e.to_string()))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| ServiceError::Io(e.to_string()))? {
            let path = entry.path();
            if path == own || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let len = entry.metadata().await.map(|m| m.len() as usize).unwrap_or(0);
            let key_len = path.file_stem().map(|s| s.len()).unwrap_or(0);
            total += len + key_len;
        }
        Ok(total)
    }
}

#[async_trait]
impl KeyValueBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::Io(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ServiceError> {
        if self.quota.is_some() {
            let other_usage = self.usage_excluding(key).await?;
            check_quota(key, self.quota, other_usage, &value)?;
        }
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).await.map_err(|e| ServiceError::Io(e.to_string()))?;
        fs::rename(&tmp, &path).await.map_err(|e| ServiceError::Io(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_enforces_quota_across_keys() -> Result<(), anyhow::Error> {
        let backend = MemoryBackend::with_quota(40);
        backend.set("a", "x".repeat(20)).await?;
        // replacing the same key only counts the new value
        backend.set("a", "y".repeat(30)).await?;

        let err = backend.set("b", "z".repeat(10)).await.unwrap_err();
        assert!(matches!(err, ServiceError::QuotaExceeded { ref key, quota: 40, .. } if key == "b"));
        assert_eq!(backend.get("b").await?, None);
        assert_eq!(backend.get("a").await?.map(|s| s.len()), Some(30));
        Ok(())
    }

    #[tokio::test]
    async fn file_backend_persists_and_reopens() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("fallback_kv_{}", uuid::Uuid::new_v4()));
        let backend = FileBackend::new(&dir, None).await?;

        assert_eq!(backend.get("mockBookings").await?, None);
        backend.set("mockBookings", "[]".into()).await?;
        backend.set("mockBookings", r#"[{"_id":"mock-1"}]"#.into()).await?;

        let reopened = FileBackend::new(&dir, None).await?;
        assert_eq!(reopened.get("mockBookings").await?.as_deref(), Some(r#"[{"_id":"mock-1"}]"#));

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_backend_quota_counts_other_files() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("fallback_kv_{}", uuid::Uuid::new_v4()));
        let backend = FileBackend::new(&dir, Some(64)).await?;
        backend.set("mockPayments", "p".repeat(40)).await?;
        let err = backend.set("mockBookings", "b".repeat(20)).await.unwrap_err();
        assert!(matches!(err, ServiceError::QuotaExceeded { .. }));
        assert_eq!(backend.get("mockBookings").await?, None);

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
