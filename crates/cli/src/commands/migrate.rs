//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - catalog `PostgreSQL` connection string
//!
//! Migrations live in `crates/storefront/migrations/`.

use threadline_storefront::db;

use super::{CommandError, database_url};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the URL is unset, the connection fails, or a
/// migration fails.
pub async fn storefront() -> Result<(), CommandError> {
    let url = database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Running storefront migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
