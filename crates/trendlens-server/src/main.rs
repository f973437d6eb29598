mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use trendlens_core::cache::InMemoryCache;
use trendlens_extract::Analyzer;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = trendlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = trendlens_core::catalog::load_catalog(&config.catalog_path)?;
    tracing::info!(
        entries = catalog.entries.len(),
        path = %config.catalog_path.display(),
        "reference catalog loaded"
    );

    let analyzer = Arc::new(Analyzer::from_config(&config, catalog)?);
    if !analyzer.has_credential() {
        tracing::warn!("TRENDLENS_LLM_API_KEY not set; analyze requests will fail until configured");
    }

    let cache = Arc::new(InMemoryCache::new(Duration::from_secs(config.cache_ttl_secs)));
    let app = build_app(AppState { analyzer, cache });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
