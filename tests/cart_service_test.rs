mod common;

use chrono::Utc;
use common::TestApp;
use nutripaw_storefront::{
    entities::product,
    errors::ServiceError,
    services::carts::{CartOwner, CartService},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

fn cart_service(app: &TestApp) -> CartService {
    app.state.services.carts.clone()
}

fn session_owner(token: &str) -> CartOwner {
    CartOwner::Session(token.to_string())
}

#[tokio::test]
async fn get_or_create_returns_the_same_cart() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-stable");

    let first = carts.get_or_create_cart(&owner).await.expect("create cart");
    let second = carts.get_or_create_cart(&owner).await.expect("find cart");

    assert_eq!(first.id, second.id);
    assert_eq!(first.session_id.as_deref(), Some("sess-stable"));
    assert_eq!(first.customer_id, None);
}

#[tokio::test]
async fn carts_are_scoped_per_owner_key() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);

    let anon = carts
        .get_or_create_cart(&session_owner("sess-a"))
        .await
        .expect("anonymous cart");
    let customer = carts
        .get_or_create_cart(&CartOwner::Customer(Uuid::new_v4()))
        .await
        .expect("customer cart");

    assert_ne!(anon.id, customer.id);
}

#[tokio::test]
async fn add_item_over_stock_fails_without_creating_a_line() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-stock");
    let p = app.seed_product("冻干鸡肉", "Freeze-Dried Chicken", dec!(59.00), 3).await;

    let err = carts
        .add_item(&owner, p.id, 4)
        .await
        .expect_err("over-stock add must fail");
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let lines = carts.list_items(&owner).await.expect("list");
    assert!(lines.is_empty());
}

#[tokio::test]
async fn adding_the_same_product_merges_into_one_line() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-merge-line");
    let p = app.seed_product("三文鱼猫粮", "Salmon Cat Food", dec!(128.00), 10).await;

    carts.add_item(&owner, p.id, 2).await.expect("first add");
    carts.add_item(&owner, p.id, 3).await.expect("second add");

    let lines = carts.list_items(&owner).await.expect("list");
    assert_eq!(lines.len(), 1, "merging, not duplicating");
    assert_eq!(lines[0].item.quantity, 5);
    assert_eq!(lines[0].item.unit_price, dec!(128.00));
}

#[tokio::test]
async fn merged_add_respects_stock_limit() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-merge-stock");
    let p = app.seed_product("鸭肉冻干", "Duck Treats", dec!(45.00), 5).await;

    carts.add_item(&owner, p.id, 3).await.expect("first add");
    let err = carts
        .add_item(&owner, p.id, 3)
        .await
        .expect_err("3 + 3 > 5 must fail");
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    // The existing line is untouched
    let lines = carts.list_items(&owner).await.expect("list");
    assert_eq!(lines[0].item.quantity, 3);
}

#[tokio::test]
async fn add_item_rejects_nonpositive_quantity() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-qty");
    let p = app.seed_product("猫条", "Cat Sticks", dec!(9.90), 100).await;

    for quantity in [0, -1] {
        let err = carts
            .add_item(&owner, p.id, quantity)
            .await
            .expect_err("nonpositive quantity must fail");
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn add_item_rejects_missing_and_inactive_products() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-missing");

    let err = carts
        .add_item(&owner, Uuid::new_v4(), 1)
        .await
        .expect_err("unknown product must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let inactive = app
        .seed_product_full("下架商品", "Retired Product", dec!(10.00), 10, false, false)
        .await;
    let err = carts
        .add_item(&owner, inactive.id, 1)
        .await
        .expect_err("inactive product must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn set_quantity_validates_without_mutating() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-setqty");
    let p = app.seed_product("营养膏", "Nutrition Paste", dec!(35.00), 7).await;

    let item = carts.add_item(&owner, p.id, 2).await.expect("add");

    for quantity in [0, -1, 8] {
        let result = carts.set_quantity(&owner, item.id, quantity).await;
        assert!(result.is_err(), "quantity {} must be rejected", quantity);
    }

    let lines = carts.list_items(&owner).await.expect("list");
    assert_eq!(lines[0].item.quantity, 2, "failed updates must not mutate");
}

#[tokio::test]
async fn set_quantity_updates_in_place() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-setqty-ok");
    let p = app.seed_product("鸡肉罐头", "Chicken Cans", dec!(22.00), 24).await;

    let item = carts.add_item(&owner, p.id, 1).await.expect("add");
    let updated = carts
        .set_quantity(&owner, item.id, 6)
        .await
        .expect("update quantity");

    assert_eq!(updated.id, item.id);
    assert_eq!(updated.quantity, 6);
    assert_eq!(updated.unit_price, dec!(22.00));
}

#[tokio::test]
async fn set_quantity_rejects_items_of_other_carts() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let p = app.seed_product("磨牙棒", "Dental Chews", dec!(18.00), 50).await;

    let item = carts
        .add_item(&session_owner("sess-owner-a"), p.id, 1)
        .await
        .expect("add");

    let err = carts
        .set_quantity(&session_owner("sess-owner-b"), item.id, 2)
        .await
        .expect_err("foreign item must be rejected");
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn summary_uses_captured_prices_not_current_ones() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-prices");
    let p = app.seed_product("烘焙粮", "Baked Kibble", dec!(100.00), 10).await;

    carts.add_item(&owner, p.id, 2).await.expect("add");

    // Reprice the product after the line captured its unit price
    let mut active: product::ActiveModel = p.into();
    active.price = Set(dec!(150.00));
    active.updated_at = Set(Utc::now());
    active.update(&*app.state.db).await.expect("reprice");

    let summary = carts.summary(&owner).await.expect("summary");
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.total, dec!(200.00), "captured price, not current");
}

#[tokio::test]
async fn summary_totals_multiple_lines() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-multi");
    let a = app.seed_product("猫砂", "Cat Litter", dec!(49.90), 10).await;
    let b = app.seed_product("逗猫棒", "Teaser Wand", dec!(15.50), 10).await;

    carts.add_item(&owner, a.id, 2).await.expect("add a");
    carts.add_item(&owner, b.id, 3).await.expect("add b");

    let summary = carts.summary(&owner).await.expect("summary");
    assert_eq!(summary.item_count, 5);
    assert_eq!(summary.total, dec!(49.90) * Decimal::from(2) + dec!(15.50) * Decimal::from(3));
}

#[tokio::test]
async fn list_items_returns_newest_first() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-order");
    let first = app.seed_product("先加的", "Added First", dec!(10.00), 10).await;
    let second = app.seed_product("后加的", "Added Second", dec!(20.00), 10).await;

    carts.add_item(&owner, first.id, 1).await.expect("add first");
    // A strictly later insertion timestamp for deterministic ordering
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    carts.add_item(&owner, second.id, 1).await.expect("add second");

    let lines = carts.list_items(&owner).await.expect("list");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].item.product_id, second.id);
    assert_eq!(lines[1].item.product_id, first.id);
}

#[tokio::test]
async fn remove_item_is_idempotent() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-remove");
    let p = app.seed_product("冻干蛋黄", "Egg Yolk Treats", dec!(25.00), 10).await;

    let item = carts.add_item(&owner, p.id, 1).await.expect("add");

    carts.remove_item(&owner, item.id).await.expect("remove");
    assert!(carts.list_items(&owner).await.expect("list").is_empty());

    // Removing again is indistinguishable from success
    carts.remove_item(&owner, item.id).await.expect("second remove");
}

#[tokio::test]
async fn clear_empties_the_cart_and_summary() {
    let app = TestApp::new().await;
    let carts = cart_service(&app);
    let owner = session_owner("sess-clear");
    let a = app.seed_product("鱼油", "Fish Oil", dec!(68.00), 10).await;
    let b = app.seed_product("化毛膏", "Hairball Paste", dec!(32.00), 10).await;

    carts.add_item(&owner, a.id, 1).await.expect("add a");
    carts.add_item(&owner, b.id, 2).await.expect("add b");
    carts.clear(&owner).await.expect("clear");

    assert!(carts.list_items(&owner).await.expect("list").is_empty());

    let summary = carts.summary(&owner).await.expect("summary");
    assert_eq!(summary.item_count, 0);
    assert_eq!(summary.total, Decimal::ZERO);
}
