use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::admin_http;
use configs::{AppConfig, StorageKind};
use service::runtime::open_record_store;
use service::RecordStore;
use tokio::task::JoinHandle;
use tracing::info;

use crate::fallback::{FallbackClient, FallbackPolicy};
use crate::observability;
use crate::transport::ReqwestTransport;

/// Everything a host needs to issue requests with local fallback.
pub struct Runtime {
    pub client: FallbackClient<ReqwestTransport>,
    pub admin: Option<(SocketAddr, JoinHandle<()>)>,
}

/// Wrap a reqwest transport for the configured backend around `store`.
pub fn build_client(cfg: &AppConfig, store: Arc<RecordStore>) -> anyhow::Result<FallbackClient<ReqwestTransport>> {
    let transport = ReqwestTransport::new(
        &cfg.backend.base_url,
        Duration::from_secs(cfg.backend.connect_timeout_secs),
        Duration::from_secs(cfg.backend.request_timeout_secs),
    )?;
    let policy = FallbackPolicy::from(&cfg.fallback);
    info!(
        backend = %cfg.backend.base_url,
        enabled = policy.enabled,
        unclassified = ?policy.unclassified,
        "fallback client ready"
    );
    Ok(FallbackClient::new(transport, store, policy))
}

/// Check the environment, open the record store, build the client and, if
/// configured, start the admin server.
pub async fn start(cfg: &AppConfig) -> anyhow::Result<Runtime> {
    common::env::check_backend_url(&cfg.backend.base_url);
    if cfg.storage.kind == StorageKind::File {
        common::env::ensure_data_dir(&cfg.storage.data_dir).await?;
    }
    let store = open_record_store(&cfg.storage).await?;
    let client = build_client(cfg, store)?;

    let admin = match cfg.admin.addr.as_deref() {
        Some(addr) => Some(admin_http::spawn_admin_server(addr, observability::encode_metrics).await?),
        None => None,
    };
    Ok(Runtime { client, admin })
}
