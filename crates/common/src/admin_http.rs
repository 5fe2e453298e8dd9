//! Lightweight admin HTTP server
//!
//! Exposes `/healthz` and `/metrics` endpoints, with metrics provided by caller.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the admin router. The metrics body is produced by `metrics_fn` on each scrape.
pub fn admin_router(metrics_fn: fn() -> (StatusCode, String)) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(move || async move { metrics_fn() }))
}

/// Bind `addr` and serve the admin router on the current runtime.
/// Returns the bound address (useful with port 0) and the server task.
pub async fn spawn_admin_server(
    addr: &str,
    metrics_fn: fn() -> (StatusCode, String),
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("cannot bind admin server on {addr}: {e}"))?;
    let local = listener.local_addr()?;
    info!(addr = %local, "admin server listening");

    let router = admin_router(metrics_fn);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "admin server stopped");
        }
    });
    Ok((local, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_metrics() -> (StatusCode, String) {
        (StatusCode::OK, "fallback_synthesized_total 3\n".to_string())
    }

    #[tokio::test]
    async fn serves_healthz_and_metrics() -> anyhow::Result<()> {
        let (addr, handle) = spawn_admin_server("127.0.0.1:0", fake_metrics).await?;

        let health: serde_json::Value = reqwest::get(format!("http://{addr}/healthz"))
            .await?
            .json()
            .await?;
        assert_eq!(health["status"], "ok");

        let metrics = reqwest::get(format!("http://{addr}/metrics")).await?.text().await?;
        assert!(metrics.contains("fallback_synthesized_total 3"));

        handle.abort();
        Ok(())
    }
}
