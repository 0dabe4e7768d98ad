use crate::errors::{ApiError, ServiceError};
use crate::services::carts::CartOwner;
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

/// Header carrying the authenticated customer id, as resolved by the auth
/// collaborator in front of this service.
pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";
/// Header carrying the anonymous session token minted by the client.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Resolves the cart owner for a request: the authenticated customer when
/// the auth collaborator injected one, the anonymous session token
/// otherwise. A request carrying neither cannot have a cart.
pub fn cart_owner_from_headers(headers: &HeaderMap) -> Result<CartOwner, ApiError> {
    if let Some(raw) = headers.get(CUSTOMER_ID_HEADER) {
        let raw = raw
            .to_str()
            .map_err(|_| ApiError::BadRequest("Malformed customer id header".to_string()))?;
        let customer_id = Uuid::parse_str(raw)
            .map_err(|_| ApiError::BadRequest("Malformed customer id header".to_string()))?;
        return Ok(CartOwner::Customer(customer_id));
    }

    if let Some(raw) = headers.get(SESSION_TOKEN_HEADER) {
        let token = raw
            .to_str()
            .map_err(|_| ApiError::BadRequest("Malformed session token header".to_string()))?;
        if !token.is_empty() {
            return Ok(CartOwner::Session(token.to_string()));
        }
    }

    Err(ApiError::BadRequest(format!(
        "Either {} or {} header is required",
        CUSTOMER_ID_HEADER, SESSION_TOKEN_HEADER
    )))
}

/// Standard pagination response metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, per_page, total),
        }
    }
}
