//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the record store is opened.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the directory backing the file store exists, creating it if needed.
pub async fn ensure_data_dir(data_dir: &Path) -> anyhow::Result<()> {
    if tokio::fs::metadata(data_dir).await.is_err() {
        info!(data_dir = %data_dir.display(), "creating data directory for local records");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    Ok(())
}

/// Warn when the backend URL points somewhere a browser-less host is unlikely to reach.
pub fn check_backend_url(base_url: &str) {
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        warn!(%base_url, "backend url has no http(s) scheme; every call will be treated as unreachable");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_data_dir_creates_nested_dirs() -> anyhow::Result<()> {
        let dir = std::env::temp_dir()
            .join(format!("fallback_env_{}", uuid::Uuid::new_v4()))
            .join("nested");
        ensure_data_dir(&dir).await?;
        assert!(tokio::fs::metadata(&dir).await?.is_dir());

        // second call is a no-op
        ensure_data_dir(&dir).await?;

        if let Some(parent) = dir.parent() {
            let _ = tokio::fs::remove_dir_all(parent).await;
        }
        Ok(())
    }
}
