#![allow(dead_code)] // each test binary uses a different slice of this harness

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::get,
    Router,
};
use chrono::Utc;
use nutripaw_storefront::{
    config::AppConfig,
    db,
    entities::product,
    events::{self, EventSender},
    localized::LocalizedText,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness spinning up application state backed by an in-memory
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // Minimal configuration suitable for tests. A single pooled
        // connection keeps the in-memory database alive across queries.
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.auto_migrate = true;
        cfg.mock_payment_delay_ms = 10;

        let pool = db::connect(&cfg).await.expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = Arc::new(AppState::new(db_arc, cfg, event_sender));

        let router = Router::new()
            .route("/health", get(|| async { "ok" }))
            .nest("/api/v1", nutripaw_storefront::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with optional JSON body and
    /// extra headers.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Read a JSON response body, asserting the expected status first.
    pub async fn json_body(response: axum::response::Response, expected: StatusCode) -> Value {
        assert_eq!(response.status(), expected, "unexpected response status");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        serde_json::from_slice(&bytes).expect("response body is not valid json")
    }

    /// Parse a JSON field serialized from a `Decimal`. Comparing parsed
    /// values instead of strings keeps assertions independent of the
    /// scale the database hands back.
    pub fn decimal_field(value: &Value) -> Decimal {
        value
            .as_str()
            .expect("decimal fields serialize as strings")
            .parse()
            .expect("decimal field parses")
    }

    /// Seed a bilingual product with the given price and stock.
    pub async fn seed_product(
        &self,
        name_zh: &str,
        name_en: &str,
        price: Decimal,
        stock: i32,
    ) -> product::Model {
        self.seed_product_full(name_zh, name_en, price, stock, true, false)
            .await
    }

    pub async fn seed_product_full(
        &self,
        name_zh: &str,
        name_en: &str,
        price: Decimal,
        stock: i32,
        is_active: bool,
        is_featured: bool,
    ) -> product::Model {
        let name = LocalizedText::bilingual(name_zh, name_en);
        let description = LocalizedText::bilingual(
            format!("{}的详细介绍", name_zh),
            format!("All about {}", name_en),
        );

        let row = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_json()),
            description: Set(description.to_json()),
            price: Set(price),
            compare_at_price: Set(None),
            stock_quantity: Set(stock),
            images: Set(serde_json::json!(["https://cdn.nutripaw.example/p1.jpg"])),
            is_active: Set(is_active),
            is_featured: Set(is_featured),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        row.insert(&*self.state.db)
            .await
            .expect("failed to seed test product")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}
