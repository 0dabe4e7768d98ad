use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    services::carts::{CartLine, CartOwner, CartService},
};

/// In-memory view of the cart for the UI shell.
///
/// Caches the line list and re-fetches it unconditionally after every
/// mutation, so the displayed state is backend truth once the round trip
/// completes. That costs one extra read per mutation and means no
/// optimistic local patching anywhere. Totals are derived from the cache
/// on every call, never stored.
pub struct CartState {
    service: CartService,
    owner: CartOwner,
    lines: Vec<CartLine>,
}

impl CartState {
    /// Fetches once and returns the mounted state.
    pub async fn mount(service: CartService, owner: CartOwner) -> Result<Self, ServiceError> {
        let mut state = Self {
            service,
            owner,
            lines: Vec::new(),
        };
        state.refresh().await?;
        Ok(state)
    }

    pub fn owner(&self) -> &CartOwner {
        &self.owner
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of line quantities, recomputed from the cache.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.item.quantity)).sum()
    }

    /// Sum of captured price times quantity, recomputed from the cache.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.item.line_total()).sum()
    }

    pub async fn refresh(&mut self) -> Result<(), ServiceError> {
        self.lines = self.service.list_items(&self.owner).await?;
        Ok(())
    }

    pub async fn add(&mut self, product_id: Uuid, quantity: i32) -> Result<(), ServiceError> {
        self.service
            .add_item(&self.owner, product_id, quantity)
            .await?;
        self.refresh().await
    }

    pub async fn update_quantity(
        &mut self,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        self.service
            .set_quantity(&self.owner, item_id, quantity)
            .await?;
        self.refresh().await
    }

    pub async fn remove(&mut self, item_id: Uuid) -> Result<(), ServiceError> {
        self.service.remove_item(&self.owner, item_id).await?;
        self.refresh().await
    }

    pub async fn clear(&mut self) -> Result<(), ServiceError> {
        self.service.clear(&self.owner).await?;
        self.refresh().await
    }

    /// Login transition: folds the anonymous cart into the customer's
    /// cart, switches the owner, and re-fetches. A no-op merge (already
    /// merged, or the state was mounted with a customer owner) is safe.
    pub async fn login(&mut self, customer_id: Uuid) -> Result<(), ServiceError> {
        if let CartOwner::Session(token) = &self.owner {
            self.service
                .merge_anonymous_cart(token, customer_id)
                .await?;
        }
        self.owner = CartOwner::Customer(customer_id);
        self.refresh().await
    }

    /// Logout transition: back to an anonymous owner with a fresh cache.
    /// The customer's cart stays durable on the backend.
    pub async fn logout(&mut self, session_token: String) -> Result<(), ServiceError> {
        self.owner = CartOwner::Session(session_token);
        self.refresh().await
    }
}
