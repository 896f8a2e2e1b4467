//! Threadline Storefront - Public e-commerce site.
//!
//! This binary serves the storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework with HTMX for interactivity
//! - Askama templates for server-side rendering
//! - Durable cart store (memory or file) namespaced per browser session
//! - `PostgreSQL` or a JSON file for the product catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use threadline_storefront::catalog::{CatalogError, ProductCatalog};
use threadline_storefront::config::{CartStoreKind, ConfigError, StorefrontConfig};
use threadline_storefront::content::{ContentError, ContentStore};
use threadline_storefront::state::AppState;
use threadline_storefront::store::{DurableStore, FileStore, MemoryStore, StoreError};
use threadline_storefront::{app, db};

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Cart store error: {0}")]
    CartStore(#[from] StoreError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry
                .environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry.sample_rate,
            traces_sample_rate: config.sentry.traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Open the configured cart store.
fn open_cart_store(kind: &CartStoreKind) -> Result<Arc<dyn DurableStore>, StoreError> {
    match kind {
        CartStoreKind::Memory => {
            tracing::warn!("Using in-memory cart store; carts are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        CartStoreKind::File(dir) => {
            tracing::info!(dir = %dir.display(), "Using file cart store");
            Ok(Arc::new(FileStore::open(dir.clone())?))
        }
    }
}

/// Pick the catalog backend: `PostgreSQL`, then a JSON file, then empty.
async fn open_catalog(config: &StorefrontConfig) -> Result<ProductCatalog, StartupError> {
    if let Some(url) = &config.database_url {
        let pool = db::create_pool(url).await?;
        tracing::info!("Database pool created");
        // Migrations are NOT run on startup: cargo run -p threadline-cli -- migrate
        return Ok(ProductCatalog::postgres(pool));
    }
    if let Some(path) = &config.catalog_file {
        return Ok(ProductCatalog::from_json_file(path)?);
    }
    tracing::warn!("No database or catalog file configured; catalog is empty");
    Ok(ProductCatalog::in_memory(Vec::new()))
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env()?;

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "threadline_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let carts = open_cart_store(&config.cart_store)?;
    let catalog = open_catalog(&config).await?;
    let content = ContentStore::load(&config.content_dir)?;
    tracing::info!(pages = content.len(), "Content loaded");

    let state = AppState::new(config.clone(), carts, content, catalog);

    let router = app(state)
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
