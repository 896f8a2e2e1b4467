//! Product catalog data access.
//!
//! # Architecture
//!
//! - Products are documents: an id plus a JSON object of fields
//! - Lookups filter by equality on `gender` and, optionally, `subcategory`
//! - In-memory caching via `moka` for query results (5 minute TTL)
//!
//! # Backends
//!
//! - `Postgres` - `storefront.products (id TEXT, data JSONB)`, see [`postgres`]
//! - `Memory` - documents loaded from a JSON array, for development and tests
//!
//! The catalog never interacts with the cart.

pub mod postgres;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use threadline_core::{CatalogQuery, ProductRecord};

/// How long a query result stays cached.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Maximum number of cached query results.
const CACHE_CAPACITY: u64 = 512;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Database query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Catalog file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A catalog document is not a JSON object with an id.
    #[error("Invalid product document: {0}")]
    InvalidDocument(String),
}

/// Where product documents come from.
#[derive(Debug, Clone)]
enum Backend {
    Postgres(PgPool),
    Memory(Arc<Vec<ProductRecord>>),
}

/// Cached, backend-agnostic product catalog.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct ProductCatalog {
    backend: Backend,
    cache: Cache<CatalogQuery, Arc<Vec<ProductRecord>>>,
}

impl std::fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory(_) => "memory",
        };
        f.debug_struct("ProductCatalog")
            .field("backend", &backend)
            .field("cached_queries", &self.cache.entry_count())
            .finish()
    }
}

impl ProductCatalog {
    fn with_backend(backend: Backend) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { backend, cache }
    }

    /// Catalog backed by the `storefront.products` table.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self::with_backend(Backend::Postgres(pool))
    }

    /// Catalog over a fixed set of records.
    #[must_use]
    pub fn in_memory(records: Vec<ProductRecord>) -> Self {
        Self::with_backend(Backend::Memory(Arc::new(records)))
    }

    /// Catalog over the documents in a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let records = load_records(path)?;
        tracing::info!(path = %path.display(), products = records.len(), "Loaded catalog file");
        Ok(Self::in_memory(records))
    }

    /// Products for a gender, optionally narrowed to one subcategory.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Database` if the backend query fails.
    pub async fn fetch_products_by_category(
        &self,
        gender: &str,
        category: Option<&str>,
    ) -> Result<Arc<Vec<ProductRecord>>, CatalogError> {
        self.fetch(CatalogQuery::by_category(gender, category)).await
    }

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Database` if the backend query fails.
    pub async fn fetch_all_products(&self) -> Result<Arc<Vec<ProductRecord>>, CatalogError> {
        self.fetch(CatalogQuery::All).await
    }

    #[instrument(skip(self))]
    async fn fetch(&self, query: CatalogQuery) -> Result<Arc<Vec<ProductRecord>>, CatalogError> {
        if let Some(hit) = self.cache.get(&query).await {
            tracing::debug!(products = hit.len(), "catalog cache hit");
            return Ok(hit);
        }

        let records = match &self.backend {
            Backend::Postgres(pool) => Arc::new(postgres::fetch(pool, &query).await?),
            Backend::Memory(all) => Arc::new(
                all.iter()
                    .filter(|record| record.matches(&query))
                    .cloned()
                    .collect(),
            ),
        };

        tracing::debug!(products = records.len(), "catalog query");
        self.cache.insert(query, Arc::clone(&records)).await;
        Ok(records)
    }

    /// Drop every cached query result.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

/// Read product documents from a JSON array file.
///
/// Each element must be an object with a string or integer `id`.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read, is not JSON, or
/// contains an element without an id.
pub fn load_records(path: &Path) -> Result<Vec<ProductRecord>, CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    let documents: Vec<Map<String, Value>> = serde_json::from_str(&raw)?;
    documents.into_iter().map(record_from_document).collect()
}

fn record_from_document(document: Map<String, Value>) -> Result<ProductRecord, CatalogError> {
    let id = match document.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            return Err(CatalogError::InvalidDocument(
                "missing string or integer \"id\"".to_string(),
            ));
        }
    };
    Ok(ProductRecord::from_document(id, document))
}
