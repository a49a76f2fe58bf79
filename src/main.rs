mod api;
mod config;
mod storage;
mod views;

use crate::api::access::AccessPolicy;
use crate::api::AppState;
use crate::config::AppConfig;
use crate::storage::ReviewStore;
use crate::views::Views;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("⛳ Starting Dog At The Turn");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Data dir: {}", config.storage.data_dir.display());
    info!("   - Static dir: {}", config.site.static_dir.display());
    info!("   - Server: {}", config.bind_addr());

    // Open the document store
    let store = Arc::new(ReviewStore::open(&config.storage.data_dir)?);
    let (reviews, courses) = (store.count_reviews().await, store.count_courses().await);
    info!(reviews, courses, "✅ Store ready");

    // Load templates
    let views = Arc::new(Views::load(&config.site.templates_dir)?);

    let access = AccessPolicy::from_config(&config.admin);
    if !access.can_compose() {
        warn!("COMPOSE_SECRET not set, /compose is disabled");
    }

    // Create application state
    let state = AppState {
        store,
        views,
        access,
        site_name: Arc::from(config.site.name.as_str()),
    };

    let app = api::router(state, &config.site.static_dir).layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET  /               - Home");
    info!("   GET  /about          - About");
    info!("   GET  /courses        - Courses");
    info!("   GET  /reviews        - Reviews, newest first");
    info!("   GET  /reviews/{{id}}   - Review detail");
    info!("   POST /search         - Search review titles");
    info!("   GET  /compose        - Compose form");
    info!("   POST /compose        - Publish review");
    info!("   GET  /health         - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("🛑 Shutdown signal received");
}
