//! `PostgreSQL` catalog queries.
//!
//! # Table: `storefront.products`
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `id` | `TEXT` | document identifier |
//! | `data` | `JSONB` | document fields |
//!
//! Created by `migrations/20260101000001_create_products.sql`. Queries use
//! runtime-checked `sqlx::query_as` so the crate builds without a database.

use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::types::Json;

use threadline_core::{CatalogQuery, ProductRecord};

type ProductRow = (String, Json<Map<String, Value>>);

const SELECT_ALL: &str = r"
    SELECT id, data
    FROM storefront.products
    ORDER BY id
";

const SELECT_BY_CATEGORY: &str = r"
    SELECT id, data
    FROM storefront.products
    WHERE data->>'gender' = $1
      AND ($2::text IS NULL OR data->>'subcategory' = $2)
    ORDER BY id
";

const UPSERT: &str = r"
    INSERT INTO storefront.products (id, data)
    VALUES ($1, $2)
    ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
";

/// Run a catalog query against the products table.
///
/// # Errors
///
/// Returns `sqlx::Error` if the query fails.
pub async fn fetch(pool: &PgPool, query: &CatalogQuery) -> Result<Vec<ProductRecord>, sqlx::Error> {
    let rows: Vec<ProductRow> = match query {
        CatalogQuery::All => sqlx::query_as(SELECT_ALL).fetch_all(pool).await?,
        CatalogQuery::ByCategory {
            gender,
            subcategory,
        } => {
            sqlx::query_as(SELECT_BY_CATEGORY)
                .bind(gender)
                .bind(subcategory.as_deref())
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows
        .into_iter()
        .map(|(id, Json(fields))| ProductRecord::from_document(id, fields))
        .collect())
}

/// Insert or replace product documents. Returns the number written.
///
/// All rows are written in one transaction.
///
/// # Errors
///
/// Returns `sqlx::Error` if any write fails; nothing is committed then.
pub async fn upsert(pool: &PgPool, records: &[ProductRecord]) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut written = 0;
    for record in records {
        written += sqlx::query(UPSERT)
            .bind(record.id.as_str())
            .bind(Json(&record.fields))
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;
    Ok(written)
}
