//! Catalog JSON API.
//!
//! Thin HTTP boundary over [`ProductCatalog`](crate::catalog::ProductCatalog).
//! Records are returned flat: `{"id": ..., <document fields>}`.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use threadline_core::ProductRecord;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query string for `GET /api/products`.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub gender: Option<String>,
    pub category: Option<String>,
}

/// Products for a gender, optionally narrowed to a category.
///
/// # Errors
///
/// Returns 400 if `gender` is missing or blank.
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<ProductRecord>>> {
    let gender = query
        .gender
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .ok_or_else(|| AppError::BadRequest("gender is required".to_string()))?;

    let products = state
        .catalog()
        .fetch_products_by_category(gender, query.category.as_deref())
        .await?;
    Ok(Json(products.to_vec()))
}

/// Every product in the catalog.
#[instrument(skip(state))]
pub async fn all(State(state): State<AppState>) -> Result<Json<Vec<ProductRecord>>> {
    let products = state.catalog().fetch_all_products().await?;
    Ok(Json(products.to_vec()))
}
