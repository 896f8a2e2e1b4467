//! Seed the product catalog from a JSON file.
//!
//! The file holds a JSON array of product documents. Every document needs an
//! `id` (string or integer); all other fields are stored as-is, so filtering
//! by `gender` and `subcategory` works once those fields are present.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use threadline_storefront::catalog::{self, postgres};
use threadline_storefront::db;
use threadline_core::{ProductRecord, catalog::GENDER_FIELD};

use super::{CommandError, database_url};

/// Upsert every product in `file` into the catalog.
///
/// # Errors
///
/// Returns an error if the file is invalid, the URL is unset, or the
/// database write fails.
pub async fn products(file: &Path, dry_run: bool) -> Result<(), CommandError> {
    info!(path = %file.display(), "Loading products from file");
    let records = catalog::load_records(file)?;

    for (gender, count) in count_by_gender(&records) {
        info!(gender, count, "Products by gender");
    }

    if dry_run {
        info!(products = records.len(), "Dry run, nothing written");
        return Ok(());
    }

    let pool = db::create_pool(&database_url()?).await?;
    info!("Connected to database");

    let written = postgres::upsert(&pool, &records).await?;
    info!(written, "Catalog seeded");
    Ok(())
}

/// Product counts keyed by `gender`, with `(none)` for documents lacking one.
fn count_by_gender(records: &[ProductRecord]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        let gender = record.field_str(GENDER_FIELD).unwrap_or("(none)");
        *counts.entry(gender).or_insert(0) += 1;
    }
    counts
}
