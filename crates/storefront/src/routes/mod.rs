//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart sidebar fragment
//! PUT  /cart                   - Replace cart with a JSON snapshot
//! POST /cart/add               - Add item (JSON line item)
//! POST /cart/update            - Change quantity by delta (form: id, delta)
//! POST /cart/remove            - Remove item (form: id)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Policy pages
//! GET  /about
//! GET  /shipping
//! GET  /returns
//!
//! # Catalog API
//! GET  /api/products?gender=&category=  - Products by category
//! GET  /api/products/all               - Every product
//! ```
//!
//! Cart mutations respond with `HX-Trigger: storage, cartUpdated`.

pub mod cart;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).put(cart::replace))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the catalog API router.
pub fn product_api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::by_category))
        .route("/all", get(products::all))
}

/// Create the policy pages router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/about", get(pages::about))
        .route("/shipping", get(pages::shipping))
        .route("/returns", get(pages::returns))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .nest("/api/products", product_api_routes())
        .merge(page_routes())
}
