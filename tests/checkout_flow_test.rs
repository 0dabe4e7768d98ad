mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use nutripaw_storefront::{
    entities::Order,
    errors::ServiceError,
    services::{
        carts::CartOwner,
        checkout::{PlaceOrderInput, ShippingAddress},
    },
};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::json;

fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        line1: "建国路 88 号".to_string(),
        line2: None,
        city: "北京".to_string(),
        province: "北京".to_string(),
        postal_code: "100022".to_string(),
        country_code: "CN".to_string(),
        phone: Some("13800000000".to_string()),
    }
}

fn order_input() -> PlaceOrderInput {
    PlaceOrderInput {
        email: "shopper@example.com".to_string(),
        recipient_name: "王小明".to_string(),
        shipping_address: shipping_address(),
    }
}

#[tokio::test]
async fn checkout_rejects_an_empty_cart() {
    let app = TestApp::new().await;
    let owner = CartOwner::Session("co-empty".to_string());

    let err = app
        .state
        .services
        .checkout
        .place_order(&owner, order_input())
        .await
        .expect_err("empty cart must be rejected");
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn checkout_snapshots_lines_and_clears_the_cart() {
    let app = TestApp::new().await;
    let carts = app.state.services.carts.clone();
    let owner = CartOwner::Session("co-happy".to_string());

    let a = app.seed_product("全价冻干", "Complete Freeze-Dried", dec!(120.00), 10).await;
    let b = app.seed_product("猫零食", "Cat Snacks", dec!(15.00), 10).await;
    carts.add_item(&owner, a.id, 2).await.expect("add a");
    carts.add_item(&owner, b.id, 1).await.expect("add b");

    let order = app
        .state
        .services
        .checkout
        .place_order(&owner, order_input())
        .await
        .expect("place order");

    assert!(order.order_number.starts_with("NP-"));
    assert_eq!(order.total, dec!(255.00));
    assert_eq!(order.currency, "CNY");
    assert_eq!(order.payment_status, "paid");
    assert!(order
        .payment_reference
        .as_deref()
        .expect("payment reference")
        .starts_with("MOCK-"));

    let lines = order.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines
        .iter()
        .any(|l| l.product_id == a.id && l.quantity == 2 && l.unit_price == dec!(120.00)));

    // The cart is empty after a successful checkout
    let summary = carts.summary(&owner).await.expect("summary");
    assert_eq!(summary.item_count, 0);

    // And the order row is durable
    let stored = Order::find_by_id(order.id)
        .one(&*app.state.db)
        .await
        .expect("query order")
        .expect("order exists");
    assert_eq!(stored.email, "shopper@example.com");
    assert_eq!(stored.session_id.as_deref(), Some("co-happy"));
    assert_eq!(stored.customer_id, None);
}

#[tokio::test]
async fn checkout_keeps_captured_prices_after_a_reprice() {
    let app = TestApp::new().await;
    let carts = app.state.services.carts.clone();
    let owner = CartOwner::Session("co-reprice".to_string());

    let p = app.seed_product("早鸟价猫粮", "Early-Bird Kibble", dec!(80.00), 10).await;
    carts.add_item(&owner, p.id, 1).await.expect("add");

    // Reprice after the line captured its unit price
    use nutripaw_storefront::entities::product;
    use sea_orm::{ActiveModelTrait, Set};
    let mut active: product::ActiveModel = p.into();
    active.price = Set(dec!(99.00));
    active.update(&*app.state.db).await.expect("reprice");

    let order = app
        .state
        .services
        .checkout
        .place_order(&owner, order_input())
        .await
        .expect("place order");

    assert_eq!(order.total, dec!(80.00), "captured price, not current");
}

#[tokio::test]
async fn checkout_over_http_returns_201() {
    let app = TestApp::new().await;
    let session = ("x-session-token", "co-http");
    let p = app.seed_product("囤货装", "Stock-Up Pack", dec!(200.00), 5).await;

    app.request(
        Method::POST,
        "/api/v1/cart/items",
        Some(json!({"product_id": p.id, "quantity": 1})),
        &[session],
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(json!({
                "email": "buyer@example.com",
                "recipient_name": "李雷",
                "shipping_address": {
                    "line1": "南京西路 1 号",
                    "city": "上海",
                    "province": "上海",
                    "postal_code": "200040",
                    "country_code": "CN"
                }
            })),
            &[session],
        )
        .await;
    let order = TestApp::json_body(response, StatusCode::CREATED).await;

    assert_eq!(order["payment_status"], "paid");
    assert_eq!(TestApp::decimal_field(&order["total"]), dec!(200));

    // Cart is empty afterwards
    let response = app
        .request(Method::GET, "/api/v1/cart/summary", None, &[session])
        .await;
    let summary = TestApp::json_body(response, StatusCode::OK).await;
    assert_eq!(summary["item_count"], 0);
}

#[tokio::test]
async fn checkout_validates_the_form() {
    let app = TestApp::new().await;
    let session = ("x-session-token", "co-form");
    let p = app.seed_product("新品", "New Arrival", dec!(10.00), 5).await;

    app.request(
        Method::POST,
        "/api/v1/cart/items",
        Some(json!({"product_id": p.id})),
        &[session],
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(json!({
                "email": "not-an-email",
                "recipient_name": "李雷",
                "shipping_address": {
                    "line1": "x", "city": "x", "province": "x",
                    "postal_code": "x", "country_code": "CN"
                }
            })),
            &[session],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let err = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(json!({"email": "a@b.com", "recipient_name": "x"})),
            &[session],
        )
        .await;
    // Missing shipping address fails JSON deserialization
    assert_ne!(err.status(), StatusCode::CREATED);
}
