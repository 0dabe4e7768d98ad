use crate::handlers::common::{
    cart_owner_from_headers, created_response, map_service_error, validate_input,
};
use crate::{errors::ApiError, services::checkout::PlaceOrderInput, AppState};
use axum::{
    extract::{Json, State},
    http::HeaderMap,
    routing::post,
    Router,
};
use std::sync::Arc;

/// Creates the router for the checkout endpoint
pub fn checkout_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(place_order))
}

/// Turn the owner's cart into an order with a mocked payment step
async fn place_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<PlaceOrderInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let owner = cart_owner_from_headers(&headers)?;
    validate_input(&payload)?;

    let order = state
        .services
        .checkout
        .place_order(&owner, payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(order))
}
