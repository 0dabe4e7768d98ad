use crate::handlers::common::{
    cart_owner_from_headers, map_service_error, no_content_response, success_response,
    validate_input,
};
use crate::{
    currency::{display_price, DisplayPrice},
    errors::ApiError,
    handlers::products::LangQuery,
    services::carts::CartLine,
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::HeaderMap,
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for cart endpoints. Every route resolves its cart
/// from the owner headers; there is no cart id in the URL.
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart))
        .route("/summary", get(get_summary))
        .route("/items", post(add_item))
        .route("/items/:item_id", put(update_item_quantity))
        .route("/items/:item_id", delete(remove_item))
        .route("/clear", post(clear_cart))
        .route("/merge", post(merge_carts))
}

/// Get the cart with its lines
async fn get_cart(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<LangQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let owner = cart_owner_from_headers(&headers)?;
    let lang = query.language(&state.config.default_language);

    let lines = state
        .services
        .carts
        .list_items(&owner)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(CartResponse::from_lines(
        &lines,
        &lang,
        state.config.base_currency(),
    )))
}

/// Get derived cart totals
async fn get_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let owner = cart_owner_from_headers(&headers)?;

    let summary = state
        .services
        .carts
        .summary(&owner)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}

/// Add a product to the cart
async fn add_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let owner = cart_owner_from_headers(&headers)?;
    validate_input(&payload)?;

    let item = state
        .services
        .carts
        .add_item(&owner, payload.product_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// Set a line's quantity
async fn update_item_quantity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let owner = cart_owner_from_headers(&headers)?;
    validate_input(&payload)?;

    let item = state
        .services
        .carts
        .set_quantity(&owner, item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// Remove a line from the cart
async fn remove_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(item_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let owner = cart_owner_from_headers(&headers)?;

    state
        .services
        .carts
        .remove_item(&owner, item_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Clear all lines from the cart
async fn clear_cart(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let owner = cart_owner_from_headers(&headers)?;

    state
        .services
        .carts
        .clear(&owner)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "message": "Cart cleared"
    })))
}

/// Fold the anonymous cart into the customer's cart at login. The call
/// site decides when; nothing triggers this automatically.
async fn merge_carts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<MergeCartsRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let token = headers
        .get(crate::handlers::common::SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("Merging requires the session token header".to_string())
        })?;

    state
        .services
        .carts
        .merge_anonymous_cart(token, payload.customer_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct MergeCartsRequest {
    pub customer_id: Uuid,
}

// Response DTOs

/// Cart as rendered for one language.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub item_count: i64,
    pub total: Decimal,
    pub display_total: DisplayPrice,
}

#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub display_line_total: DisplayPrice,
}

impl CartResponse {
    pub fn from_lines(
        lines: &[CartLine],
        lang: &str,
        base: crate::currency::CurrencyCode,
    ) -> Self {
        let items: Vec<CartLineResponse> = lines
            .iter()
            .map(|line| CartLineResponse {
                id: line.item.id,
                product_id: line.item.product_id,
                name: line.product.localized_name().resolve(lang).to_string(),
                image: line.product.image_urls().into_iter().next(),
                quantity: line.item.quantity,
                unit_price: line.item.unit_price,
                line_total: line.item.line_total(),
                display_line_total: display_price(line.item.line_total(), base, lang),
            })
            .collect();

        let item_count = lines.iter().map(|l| i64::from(l.item.quantity)).sum();
        let total: Decimal = lines.iter().map(|l| l.item.line_total()).sum();

        Self {
            items,
            item_count,
            total,
            display_total: display_price(total, base, lang),
        }
    }
}
