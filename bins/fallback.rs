use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use common::utils::logging::init_logging;
use dotenvy::dotenv;
use gateway::{bootstrap, HttpTransport, TransportError};
use models::{ApiRequest, Booking, Collection, HttpMethod, Payment};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "fallback")]
#[command(about = "Send booking API requests with local fallback when the backend is unavailable")]
#[command(after_help = "Environment:\n  BACKEND_URL   Backend base URL (default http://localhost:8000)\n  CONFIG_PATH   Config file (default config.toml)\n  RUST_LOG      Log filter")]
struct Cli {
    /// Config file; defaults to $CONFIG_PATH or config.toml
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue one request and print the response
    Send {
        method: String,
        path: String,
        /// Request body, sent as-is
        #[arg(long)]
        body: Option<String>,
    },
    /// Print a locally stored collection
    List { collection: String },
}

fn build_request(method: &str, path: &str, body: Option<String>) -> anyhow::Result<ApiRequest> {
    let method: HttpMethod = method.parse()?;
    let req = ApiRequest::new(method, path);
    Ok(match body {
        Some(text) => match serde_json::from_str::<Value>(&text) {
            Ok(v) => req.with_json(v),
            Err(_) => req.with_text(text),
        },
        None => req,
    })
}

async fn run(cli: Cli, cfg: configs::AppConfig) -> anyhow::Result<()> {
    let runtime = bootstrap::start(&cfg).await?;

    match cli.command {
        Command::Send { method, path, body } => {
            let req = build_request(&method, &path, body)?;
            match runtime.client.send(&req).await {
                Ok(resp) => {
                    info!(status = resp.status, source = ?resp.source, "request resolved");
                    println!("{}", serde_json::to_string_pretty(&resp)?);
                }
                Err(TransportError::Status(resp)) => {
                    println!("{}", serde_json::to_string_pretty(&resp)?);
                    return Err(anyhow!("backend answered {} {}", resp.status, resp.status_text));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::List { collection } => {
            let collection: Collection = collection.parse()?;
            let store = runtime.client.store();
            let out = match collection {
                Collection::Bookings => serde_json::to_value(store.read_all::<Booking>().await)?,
                Collection::Payments => serde_json::to_value(store.read_all::<Payment>().await)?,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    if let Some((_, handle)) = runtime.admin {
        handle.abort();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(configs::config_path);
    let cfg = configs::AppConfig::load_and_validate(&config_path)
        .with_context(|| format!("loading config from {config_path}"))?;
    init_logging(&cfg.logging.format);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");
    info!(service = "fallback", event = "start", %service_id, pid, version, config_path = %config_path, "fallback client starting");

    let result = run(cli, cfg).await;
    if let Err(e) = &result {
        error!(service = "fallback", event = "failed", %service_id, error = %e, "request failed");
    }
    info!(service = "fallback", event = "stop", %service_id, pid, "fallback client stopped");
    result
}
