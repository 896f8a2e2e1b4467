//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The session holds only a cart owner token; each request rebuilds the
//! cart manager from the durable store under that owner's namespace, so the
//! store is always the source of truth.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use threadline_core::{Cart, CartLineItem, ItemId};

use crate::cart::{CartError, CartStateManager, Channel};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::CartOwner;
use crate::state::AppState;
use crate::store::Namespaced;

/// Cart item display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    /// Floored unit price.
    pub price: i64,
    pub line_total: i64,
    pub color: Option<String>,
    pub size: Option<String>,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartSidebarView {
    pub items: Vec<CartItemView>,
    pub subtotal: i64,
    pub item_count: u64,
}

impl From<&CartLineItem> for CartItemView {
    fn from(item: &CartLineItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            image: item.image.clone().unwrap_or_default(),
            quantity: item.quantity,
            price: item.price.units(),
            line_total: item.line_total(),
            color: item.color.as_ref().map(|c| c.name.clone()),
            size: item.size.as_ref().map(|s| s.name.clone()),
        }
    }
}

impl From<&Cart> for CartSidebarView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal(),
            item_count: cart.item_count(),
        }
    }
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub delta: i64,
}

/// Remove item form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Cart sidebar fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_sidebar.html")]
pub struct CartSidebarTemplate {
    pub cart: CartSidebarView,
    pub open: bool,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

// =============================================================================
// Helpers
// =============================================================================

/// Open the session's cart and apply `op` to it.
///
/// Store I/O can block (the file backend), so loading and `op` run on the
/// blocking pool.
async fn with_session_cart<F>(
    state: &AppState,
    session: &Session,
    op: F,
) -> Result<CartStateManager<Namespaced>>
where
    F: FnOnce(&mut CartStateManager<Namespaced>) -> std::result::Result<(), CartError>
        + Send
        + 'static,
{
    let owner = CartOwner::from_session(session).await?;
    let state = state.clone();
    let manager = tokio::task::spawn_blocking(move || {
        let mut manager = state.cart_for(owner.as_str())?;
        op(&mut manager)?;
        Ok::<_, CartError>(manager)
    })
    .await
    .map_err(|e| AppError::Internal(format!("cart task failed: {e}")))??;
    Ok(manager)
}

/// Open the session's cart for reading.
async fn session_cart(
    state: &AppState,
    session: &Session,
) -> Result<CartStateManager<Namespaced>> {
    with_session_cart(state, session, |_| Ok(())).await
}

/// Render the sidebar after a mutation, announcing the change to other views.
fn changed(manager: &CartStateManager<Namespaced>) -> Response {
    (
        AppendHeaders([("HX-Trigger", Channel::trigger_all())]),
        CartSidebarTemplate {
            cart: CartSidebarView::from(manager.cart()),
            open: true,
        },
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart sidebar fragment.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let manager = session_cart(&state, &session).await?;
    Ok(CartSidebarTemplate {
        cart: CartSidebarView::from(manager.cart()),
        open: true,
    })
}

/// Add an item to the cart, merging with an existing line of the same id.
#[instrument(skip(state, session, item), fields(id = %item.id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(item): Json<CartLineItem>,
) -> Result<Response> {
    add_breadcrumb("cart", "Added item", Some(&[("item_id", item.id.as_str())]));
    let manager = with_session_cart(&state, &session, move |cart| cart.add_item(item)).await?;
    Ok(changed(&manager))
}

/// Change an item's quantity by a signed delta (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let id = ItemId::new(form.id);
    let manager = with_session_cart(&state, &session, move |cart| {
        cart.update_quantity(&id, form.delta)
    })
    .await?;
    Ok(changed(&manager))
}

/// Remove an item from the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    add_breadcrumb("cart", "Removed item", Some(&[("item_id", form.id.as_str())]));
    let id = ItemId::new(form.id);
    let manager = with_session_cart(&state, &session, move |cart| cart.remove_item(&id)).await?;
    Ok(changed(&manager))
}

/// Replace the whole cart with a snapshot from the cart provider.
#[instrument(skip(state, session, items), fields(items = items.len()))]
pub async fn replace(
    State(state): State<AppState>,
    session: Session,
    Json(items): Json<Vec<CartLineItem>>,
) -> Result<Response> {
    let manager = with_session_cart(&state, &session, move |cart| {
        cart.replace(Cart::from(items))
    })
    .await?;
    Ok(changed(&manager))
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let manager = session_cart(&state, &session).await?;
    Ok(CartCountTemplate {
        count: manager.item_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use threadline_core::ItemOption;

    use super::*;

    #[test]
    fn test_sidebar_view_totals() {
        let mut shirt = CartLineItem::new("1", "Shirt", "500.99", 2);
        shirt.color = Some(ItemOption::named("Navy"));
        let cart = Cart::from(vec![shirt, CartLineItem::new("2", "Socks", 300_i64, 1)]);

        let view = CartSidebarView::from(&cart);
        assert_eq!(view.subtotal, 1300);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items[0].price, 500);
        assert_eq!(view.items[0].line_total, 1000);
        assert_eq!(view.items[0].color.as_deref(), Some("Navy"));
        assert!(view.items[0].size.is_none());
    }

    #[test]
    fn test_sidebar_renders_grouped_subtotal_and_omits_missing_options() {
        let cart = Cart::from(vec![CartLineItem::new("coat", "Coat", 1_234_567_i64, 1)]);
        let html = CartSidebarTemplate {
            cart: CartSidebarView::from(&cart),
            open: true,
        }
        .render()
        .unwrap();

        assert!(html.contains("1,234,567"));
        assert!(html.contains("Coat"));
        assert!(!html.contains("Color:"));
        assert!(!html.contains("Size:"));
    }

    #[test]
    fn test_empty_sidebar() {
        let html = CartSidebarTemplate {
            cart: CartSidebarView::from(&Cart::default()),
            open: false,
        }
        .render()
        .unwrap();
        assert!(html.contains("Your cart is empty"));
    }
}
