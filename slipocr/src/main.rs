use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slipocr::api::{create_router, AppState};
use slipocr::config::Config;
use slipocr::jobs::JobOrchestrator;
use slipocr::ocr::{Recognizer, SlipPreprocessor};
use slipocr::store::{open_store, ExpiryPurger};

#[derive(Parser)]
#[command(name = "slipocr")]
#[command(about = "OCR and field extraction service for Thai bank transfer slips")]
struct Args {
    /// Address to bind, overrides HOST
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "slipocr=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.server.api_key.is_none() {
        tracing::warn!("API_KEY is not set - slip endpoints are open to any caller");
    }

    tracing::info!("Initializing job store...");
    let store = open_store(&config.store).await?;

    tracing::info!("Initializing OCR engines...");
    let recognizer = Recognizer::from_config(&config.ocr);
    if !recognizer.is_available() {
        tracing::error!("No OCR engine available - every job will fail until one is configured");
    }

    let orchestrator = JobOrchestrator::new(
        store.clone(),
        recognizer,
        Arc::new(SlipPreprocessor::new(&config.ocr)),
        Duration::from_secs(config.store.ttl_secs),
    )
    .with_processing_snapshots(config.processing.persist_processing_status)
    .with_confidence_threshold(config.ocr.confidence_threshold);

    let cancel_token = CancellationToken::new();

    tracing::info!(
        "Starting expiry purger... (interval={}s)",
        config.store.purge_interval_secs
    );
    let purger = ExpiryPurger::new(
        store,
        Duration::from_secs(config.store.purge_interval_secs.max(1)),
    );
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Expiry purger shutting down...");
                    break;
                }
                _ = tokio::time::sleep(purger.interval()) => {
                    if let Err(e) = purger.run_once().await {
                        tracing::error!("Expiry purger error: {}", e);
                    }
                }
            }
        }
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let api_prefix = config.server.api_prefix.clone();
    let app = create_router(AppState::new(config, orchestrator));

    tracing::info!("Slip OCR starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API:          http://{}{}", addr, api_prefix);
    tracing::info!("  API docs:     http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
