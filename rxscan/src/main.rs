use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rxscan::api::v1::dto::PrescriptionScanResponse;
use rxscan::api::{create_router, AppState};
use rxscan::config::Config;
use rxscan::pipeline::{PrescriptionPipeline, ScanOptions};

#[derive(Parser)]
#[command(name = "rxscan", version)]
#[command(about = "Scan prescription images and extract patient, doctor, drug, and quantity fields")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Scan one prescription image and print the result as JSON
    Scan {
        image: PathBuf,
        /// Persist the record (requires STORAGE_ENABLED=true)
        #[arg(long)]
        store: bool,
    },
    /// Extract fields from already-recognized text (stdin when no input is given)
    Extract {
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        store: bool,
    },
}

fn init_tracing() {
    let json = std::env::var("RXSCAN_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rxscan=info,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Scan { image, store } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Failed to read {}", image.display()))?;
            let pipeline = PrescriptionPipeline::from_config(&config).await?;
            let scan = pipeline.scan(&bytes, ScanOptions { store }).await?;
            print_json(PrescriptionScanResponse::from(scan))
        }
        Command::Extract { text, file, store } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => std::io::read_to_string(std::io::stdin())
                    .context("Failed to read prescription text from stdin")?,
            };
            let pipeline = PrescriptionPipeline::from_config(&config).await?;
            let scan = pipeline.scan_text(&text, ScanOptions { store }).await;
            print_json(PrescriptionScanResponse::from(scan))
        }
    }
}

fn print_json(response: PrescriptionScanResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "RXSCAN_API_KEYS is not set, every protected route will answer 401. Set RXSCAN_API_KEYS to enable access."
        );
    }

    tracing::info!("Initializing prescription pipeline (OCR model: {})...", config.ocr.model);
    let pipeline = PrescriptionPipeline::from_config(&config).await?;
    let state = AppState::new(config.clone(), pipeline);

    let cancel_token = CancellationToken::new();

    let sync_interval = config.database.sync_interval_secs;
    if let (Some(records), Some(_), true) = (
        state.records().cloned(),
        config.database.local_path.as_ref(),
        sync_interval > 0,
    ) {
        tracing::info!("Starting replica sync... (interval={}s)", sync_interval);
        let token = cancel_token.child_token();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Replica sync shutting down...");
                        break;
                    }
                    _ = tokio::time::sleep(tokio::time::Duration::from_secs(sync_interval)) => {
                        if let Err(e) = records.sync().await {
                            tracing::error!("Replica sync error: {}", e);
                        }
                    }
                }
            }
        });
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("rxscan starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    tracing::info!("rxscan stopped");
    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = cancel_token.cancelled() => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
    cancel_token.cancel();
}
