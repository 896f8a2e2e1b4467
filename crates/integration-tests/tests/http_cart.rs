//! Cart, page and catalog routes through the full storefront router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::json;

use threadline_integration_tests::TestApp;
use threadline_storefront::cart::CartUpdated;
use threadline_storefront::store::DurableStore;

fn scenario_snapshot() -> serde_json::Value {
    json!([
        {"id": 1, "name": "Linen Shirt", "price": "500.99", "quantity": 2, "image": "shirt.jpg",
         "color": {"name": "Navy"}, "size": {"name": "M"}},
        {"id": 2, "name": "Canvas Tote", "price": 300, "quantity": 1, "image": "tote.jpg"}
    ])
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let resp = app.client().get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
    assert!(resp.header("x-request-id").is_some());
}

#[tokio::test]
async fn test_new_session_sees_empty_cart() {
    let app = TestApp::new();
    let mut client = app.client();

    let resp = client.get("/cart").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Your cart is empty"));
    assert!(resp.header("set-cookie").is_some());

    let count = client.get("/cart/count").await;
    assert!(!count.body.contains("cart-count-badge"));
}

#[tokio::test]
async fn test_snapshot_then_edit_flow() {
    let app = TestApp::new();
    let mut client = app.client();

    let resp = client.put_json("/cart", &scenario_snapshot()).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-trigger"), Some("storage, cartUpdated"));
    assert!(resp.body.contains("1,300"));
    assert!(resp.body.contains("Color: Navy"));
    assert!(resp.body.contains("Size: M"));

    // Tote has no color or size: only the shirt's labels render.
    assert_eq!(resp.body.matches("Color:").count(), 1);

    let resp = client.post_form("/cart/update", "id=1&delta=-5").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("800"));

    let resp = client.post_form("/cart/remove", "id=2").await;
    assert_eq!(resp.header("hx-trigger"), Some("storage, cartUpdated"));
    assert!(!resp.body.contains("Canvas Tote"));
    assert!(resp.body.contains("Linen Shirt"));

    let count = client.get("/cart/count").await;
    assert!(count.body.contains(">1<"));
}

#[tokio::test]
async fn test_subtotal_floors_prices_just_below_an_integer() {
    let app = TestApp::new();
    let mut client = app.client();

    let snapshot = json!([{"id": 5, "name": "Scarf", "price": 99.999_999_999_999_99, "quantity": 10}]);
    let resp = client.put_json("/cart", &snapshot).await;
    assert!(resp.body.contains(r#"<span class="cart-subtotal">990</span>"#));
}

#[tokio::test]
async fn test_update_leaves_other_items_stored_byte_identical() {
    let app = TestApp::new();
    let mut client = app.client();
    let mut storage = app.carts.subscribe();

    let snapshot = json!([
        {"id": 1, "name": "Shirt", "price": "500.99", "quantity": 2},
        {"id": 2, "name": "Tote", "price": 300, "quantity": 1}
    ]);
    client.put_json("/cart", &snapshot).await;
    client.post_form("/cart/update", "id=1&delta=1").await;

    let key = storage.try_recv().unwrap().key;
    let stored = app.carts.get(&key).unwrap().unwrap();
    assert_eq!(
        stored,
        r#"[{"id":1,"name":"Shirt","price":"500.99","quantity":3},{"id":2,"name":"Tote","price":300,"quantity":1}]"#
    );
}

#[tokio::test]
async fn test_add_merges_by_id() {
    let app = TestApp::new();
    let mut client = app.client();

    let item = json!({"id": "sock-1", "name": "Wool Socks", "price": 90, "quantity": 1});
    client.post_json("/cart/add", &item).await;
    let resp = client.post_json("/cart/add", &item).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body.matches("Wool Socks").count(), 1);
    assert!(resp.body.contains("180"));

    let count = client.get("/cart/count").await;
    assert!(count.body.contains(">2<"));
}

#[tokio::test]
async fn test_mutation_signals_both_channels_once() {
    let app = TestApp::new();
    let mut client = app.client();
    let mut storage = app.carts.subscribe();
    let mut updates = app.state.cart_bus().subscribe();

    client.put_json("/cart", &scenario_snapshot()).await;
    client.post_form("/cart/remove", "id=2").await;

    for _ in 0..2 {
        assert!(storage.try_recv().unwrap().key.ends_with(":cart"));
        assert_eq!(updates.try_recv().unwrap(), CartUpdated);
    }
    assert!(storage.try_recv().is_err());
    assert!(updates.try_recv().is_err());
}

#[tokio::test]
async fn test_reads_do_not_signal() {
    let app = TestApp::new();
    let mut client = app.client();
    let mut updates = app.state.cart_bus().subscribe();

    client.get("/cart").await;
    client.get("/cart/count").await;
    assert!(updates.try_recv().is_err());
}

#[tokio::test]
async fn test_sessions_have_separate_carts() {
    let app = TestApp::new();
    let mut alice = app.client();
    let mut bob = app.client();

    alice.put_json("/cart", &scenario_snapshot()).await;

    let resp = bob.get("/cart").await;
    assert!(resp.body.contains("Your cart is empty"));
    let resp = alice.get("/cart").await;
    assert!(resp.body.contains("Linen Shirt"));
}

#[tokio::test]
async fn test_invalid_cart_payload_is_rejected() {
    let app = TestApp::new();
    let mut client = app.client();

    let resp = client
        .post_json("/cart/add", &json!({"name": "No id", "price": 1, "quantity": 1}))
        .await;
    assert!(resp.status.is_client_error());

    let resp = client.post_form("/cart/update", "id=1&delta=lots").await;
    assert!(resp.status.is_client_error());
}

#[test]
fn test_malformed_stored_cart_starts_empty() {
    let app = TestApp::new();
    app.carts.set("owner-1:cart", "{not a cart").unwrap();

    let mgr = app.state.cart_for("owner-1").unwrap();
    assert!(mgr.cart().is_empty());
}

#[tokio::test]
async fn test_policy_pages() {
    let app = TestApp::new();
    let mut client = app.client();

    let resp = client.get("/shipping").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("<title>Shipping | Threadline</title>"));
    assert!(resp.body.contains("<strong>2 days</strong>"));

    let resp = client.get("/returns").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_api() {
    let app = TestApp::new();
    let mut client = app.client();

    let resp = client.get("/api/products?gender=women").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json().as_array().unwrap().len(), 3);

    let resp = client.get("/api/products?gender=women&category=dresses").await;
    let products = resp.json();
    let ids: Vec<&str> = products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["d1", "d2"]);
    assert_eq!(products[0]["name"], "Wrap Dress");

    let resp = client.get("/api/products?gender=kids").await;
    assert_eq!(resp.json(), json!([]));

    let resp = client.get("/api/products").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = client.get("/api/products/all").await;
    assert_eq!(resp.json().as_array().unwrap().len(), 4);
}
