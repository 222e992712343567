use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing_appender::non_blocking::WorkerGuard;

use pizzabot::api::session_routes;
use pizzabot::catalog::{CatalogClient, HttpCatalog};
use pizzabot::channels::CliChannel;
use pizzabot::config::{CatalogConfig, DialogueConfig, ServerConfig, SessionConfig};
use pizzabot::session::{SessionManager, spawn_prune_task};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = init_tracing();

    let dialogue_config = DialogueConfig::from_env();
    let catalog_config = CatalogConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;
    let session_config = SessionConfig::from_env()?;

    eprintln!("🍕 Pizzabot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Keywords: {}", dialogue_config.keywords.join(", "));
    eprintln!(
        "   Sessions: idle timeout {}s",
        session_config.idle_timeout.as_secs()
    );

    // ── Catalog ──────────────────────────────────────────────────────────
    let catalog: Option<Arc<dyn CatalogClient>> = match catalog_config {
        Some(config) => {
            let client = HttpCatalog::new(&config).context("Failed to build catalog client")?;
            eprintln!(
                "   Catalog: {} (timeout {}s)",
                client.base_url(),
                config.timeout.as_secs()
            );
            Some(Arc::new(client))
        }
        None => {
            eprintln!("   Catalog: disabled (set PIZZABOT_CATALOG_URL to validate orders)");
            None
        }
    };

    let manager = Arc::new(SessionManager::from_config(&dialogue_config, catalog));
    let _prune_handle = spawn_prune_task(
        Arc::clone(manager.store()),
        session_config.prune_interval,
        session_config.idle_timeout,
    );

    // ── REST server ──────────────────────────────────────────────────────
    if let Some(port) = server_config.http_port {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("Failed to bind port {port}"))?;
        let app = session_routes(Arc::clone(&manager)).layer(CorsLayer::permissive());

        eprintln!("   Sessions API: http://0.0.0.0:{port}/api/sessions");
        tokio::spawn(async move {
            tracing::info!(port, "Session API server started");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Session API server stopped");
            }
        });
    }

    eprintln!("   Type a message and press Enter. /quit to exit.\n");

    let state = CliChannel::new(manager).run().await?;
    tracing::debug!(
        ended = state.ended,
        slots = state.slots.len(),
        "CLI conversation finished"
    );

    Ok(())
}

/// Log to stderr, or to a daily file under `PIZZABOT_LOG_DIR` when set.
/// The returned guard flushes the file writer on drop.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    match std::env::var("PIZZABOT_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir.trim(), "pizzabot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
