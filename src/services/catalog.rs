use crate::{
    entities::{product, Product, ProductModel},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use uuid::Uuid;

/// Read-only product catalog for the storefront pages.
///
/// Rows are authored out of band; this service never writes them, which is
/// also why checkout does not decrement stock here.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists active products, newest first.
    ///
    /// Returns the page of rows plus the total count of matching rows.
    pub async fn list_products(
        &self,
        page: u64,
        per_page: u64,
        featured_only: bool,
    ) -> Result<(Vec<ProductModel>, u64), ServiceError> {
        let mut query = Product::find().filter(product::Column::IsActive.eq(true));

        if featured_only {
            query = query.filter(product::Column::IsFeatured.eq(true));
        }

        let paginator = query
            .order_by_desc(product::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((data, total))
    }

    /// Fetches a single product for the detail page.
    ///
    /// Inactive products are invisible to the storefront, so missing and
    /// inactive both surface as not-found.
    pub async fn get_product(&self, id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }
}
