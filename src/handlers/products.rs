use crate::handlers::common::{success_response, map_service_error, PaginatedResponse};
use crate::{
    currency::{display_price, DisplayPrice},
    entities::ProductModel,
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for catalog endpoints
pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}

/// List active products with localized fields and display prices
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl axum::response::IntoResponse, crate::errors::ApiError> {
    let lang = query.language(&state.config.default_language);

    let (products, total) = state
        .services
        .catalog
        .list_products(query.page, query.per_page, query.featured.unwrap_or(false))
        .await
        .map_err(map_service_error)?;

    let base = state.config.base_currency();
    let data: Vec<ProductResponse> = products
        .iter()
        .map(|p| ProductResponse::from_model(p, &lang, base))
        .collect();

    Ok(success_response(PaginatedResponse::new(
        data,
        query.page,
        query.per_page,
        total,
    )))
}

/// Product detail page fetch
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<LangQuery>,
) -> Result<impl axum::response::IntoResponse, crate::errors::ApiError> {
    let lang = query.language(&state.config.default_language);

    let product = state
        .services
        .catalog
        .get_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductResponse::from_model(
        &product,
        &lang,
        state.config.base_currency(),
    )))
}

// Query DTOs

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub featured: Option<bool>,
    pub lang: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl ListProductsQuery {
    fn language(&self, fallback: &str) -> String {
        self.lang.clone().unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

impl LangQuery {
    pub fn language(&self, fallback: &str) -> String {
        self.lang.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// Product as rendered for one language: localized fields resolved, price
/// converted at render time on top of the canonical base-currency amount.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub display_price: DisplayPrice,
    pub stock_quantity: i32,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub is_featured: bool,
}

impl ProductResponse {
    pub fn from_model(
        product: &ProductModel,
        lang: &str,
        base: crate::currency::CurrencyCode,
    ) -> Self {
        Self {
            id: product.id,
            name: product.localized_name().resolve(lang).to_string(),
            description: product.localized_description().resolve(lang).to_string(),
            price: product.price,
            compare_at_price: product.compare_at_price,
            display_price: display_price(product.price, base, lang),
            stock_quantity: product.stock_quantity,
            in_stock: product.stock_quantity > 0,
            images: product.image_urls(),
            is_featured: product.is_featured,
        }
    }
}
