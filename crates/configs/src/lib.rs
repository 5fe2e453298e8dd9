use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kind: StorageKind,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Upper bound on the serialized size of all stored collections.
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { kind: StorageKind::Memory, data_dir: default_data_dir(), quota_bytes: None }
    }
}

/// What the dispatcher does with a masked failure whose endpoint has no handler.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnclassifiedPolicy {
    /// Resolve with a generic 200 placeholder envelope.
    #[default]
    Placeholder,
    /// Surface the original transport error.
    Propagate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub unclassified: UnclassifiedPolicy,
    /// Path fragments for which a backend 404 is answered locally.
    #[serde(default = "default_recognized_paths")]
    pub recognized_paths: Vec<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            unclassified: UnclassifiedPolicy::Placeholder,
            recognized_paths: default_recognized_paths(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// Address for `/healthz` and `/metrics`; disabled when absent.
    #[serde(default)]
    pub addr: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

fn default_connect_timeout() -> u64 { 5 }
fn default_request_timeout() -> u64 { 30 }
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_true() -> bool { true }
fn default_log_format() -> String { "compact".to_string() }
fn default_recognized_paths() -> Vec<String> {
    vec!["/api/bookings/".to_string(), "/api/payments/".to_string()]
}

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `path` if it exists, otherwise start from defaults; then normalize and validate.
    pub fn load_and_validate(path: &str) -> Result<Self> {
        let mut cfg = if std::path::Path::new(path).exists() {
            load_from_file(path)?
        } else {
            AppConfig::default()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.backend.normalize_from_env();
        self.backend.validate()?;
        self.storage.validate()?;
        self.fallback.normalize();
        Ok(())
    }
}

impl BackendConfig {
    pub fn normalize_from_env(&mut self) {
        if self.base_url.trim().is_empty() {
            self.base_url = std::env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("backend.base_url must start with http:// or https://"));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(anyhow!("backend timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.kind == StorageKind::File && self.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_dir is required when storage.kind = \"file\""));
        }
        if self.quota_bytes == Some(0) {
            return Err(anyhow!("storage.quota_bytes must be > 0 when set"));
        }
        Ok(())
    }
}

impl FallbackConfig {
    fn normalize(&mut self) {
        self.recognized_paths.retain(|p| !p.trim().is_empty());
    }
}
