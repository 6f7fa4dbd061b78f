use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::{
    load_config, validate_config, ActionExecutor, CatalogEngine, ConnectivityMonitor,
    DurableStore, HttpActionExecutor, OfflineQueue, ProbeConnectivityMonitor, ProductSource,
    ReplayListener, ReplayReport, SqliteDurableStore, StaticConnectivity, StaticProductSource,
};

use storefront_server::api::create_router;
use storefront_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("STOREFRONT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Durable store and offline queue
    let store: Arc<dyn DurableStore> = Arc::new(
        SqliteDurableStore::new(&config.database.path)
            .context("Failed to create durable store")?,
    );
    let queue = Arc::new(OfflineQueue::new(store, config.queue.storage_key.clone()));
    info!(
        "Offline queue initialized ({} pending)",
        queue.len().await.unwrap_or_default()
    );

    // Product data source
    let mut products = match &config.catalog.seed_path {
        Some(path) => StaticProductSource::from_json_file(path)
            .with_context(|| format!("Failed to load products from {:?}", path))?,
        None => {
            warn!("No catalog seed_path configured, serving an empty catalog");
            StaticProductSource::new(Vec::new())
        }
    };
    if products.is_empty() {
        warn!("Catalog has no products");
    } else {
        info!("Catalog loaded with {} products", products.len());
    }
    if let Some(ms) = config.catalog.simulated_latency_ms {
        info!("Simulating {}ms data source latency", ms);
        products = products.with_latency(Duration::from_millis(ms));
    }
    let source: Arc<dyn ProductSource> = Arc::new(products);

    let catalog = Arc::new(CatalogEngine::new(
        source,
        config.catalog.page_size,
        config.catalog.default_sort,
    ));

    // Action executor
    let executor: Arc<dyn ActionExecutor> = Arc::new(
        HttpActionExecutor::new(&config.executor).context("Failed to create action executor")?,
    );

    // Connectivity monitor
    let probe = match &config.connectivity.probe_url {
        Some(url) => {
            info!("Probing connectivity via {}", url);
            let monitor = ProbeConnectivityMonitor::new(
                url.clone(),
                Duration::from_millis(config.connectivity.poll_interval_ms),
                Duration::from_millis(config.connectivity.timeout_ms),
            )
            .context("Failed to create connectivity monitor")?;
            monitor.start().await;
            Some(Arc::new(monitor))
        }
        None => {
            info!("No connectivity probe configured, assuming online");
            None
        }
    };
    let connectivity: Arc<dyn ConnectivityMonitor> = match &probe {
        Some(monitor) => Arc::clone(monitor) as Arc<dyn ConnectivityMonitor>,
        None => Arc::new(StaticConnectivity::online()),
    };

    // Replay the queue whenever connectivity comes back
    let listener = ReplayListener::new(
        Arc::clone(&queue),
        Arc::clone(&executor),
        Arc::clone(&connectivity),
    )
    .with_callback(Arc::new(|report: &ReplayReport| {
        info!(
            "Offline queue replayed: {} processed, {} failed",
            report.processed, report.failed
        );
    }));
    let listener_handle = match listener.start() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Connectivity subscription failed, automatic replay disabled: {}", e);
            None
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        catalog,
        queue,
        executor,
        connectivity,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let tcp_listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(tcp_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    if let Some(handle) = listener_handle {
        handle.stop();
        info!("Replay listener stopped");
    }

    if let Some(monitor) = probe {
        monitor.stop();
        info!("Connectivity monitor stopped");
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
