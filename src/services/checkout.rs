use crate::{
    entities::{order, OrderModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::carts::{CartOwner, CartService},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Simplified checkout: one call turns the owner's cart into an order.
///
/// Payment is mocked: a fixed delay that always approves. There is no
/// gateway integration. Stock is not decremented here; the catalog is
/// read-only to this service.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    cart_service: CartService,
    base_currency: String,
    payment_delay: Duration,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        cart_service: CartService,
        base_currency: String,
        payment_delay: Duration,
    ) -> Self {
        Self {
            db,
            event_sender,
            cart_service,
            base_currency,
            payment_delay,
        }
    }

    /// Places an order from the owner's current cart.
    ///
    /// Rejects an empty cart. On success the order row carries a snapshot
    /// of the lines with their captured prices, and the cart is cleared.
    #[instrument(skip(self, input))]
    pub async fn place_order(
        &self,
        owner: &CartOwner,
        input: PlaceOrderInput,
    ) -> Result<OrderModel, ServiceError> {
        let lines = self.cart_service.list_items(owner).await?;
        if lines.is_empty() {
            return Err(ServiceError::InvalidOperation("Cart is empty".to_string()));
        }

        let total: Decimal = lines.iter().map(|l| l.item.line_total()).sum();

        let snapshot: Vec<order::OrderLine> = lines
            .iter()
            .map(|l| order::OrderLine {
                product_id: l.product.id,
                name: l.product.name.clone(),
                quantity: l.item.quantity,
                unit_price: l.item.unit_price,
            })
            .collect();

        let payment_reference = self.process_mock_payment(total).await?;

        let order_id = Uuid::new_v4();
        let (customer_id, session_id) = match owner {
            CartOwner::Customer(id) => (Some(*id), None),
            CartOwner::Session(token) => (None, Some(token.clone())),
        };

        let order = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(format!(
                "NP-{}",
                order_id.to_string()[..8].to_uppercase()
            )),
            customer_id: Set(customer_id),
            session_id: Set(session_id),
            email: Set(input.email),
            recipient_name: Set(input.recipient_name),
            shipping_address: Set(serde_json::to_value(&input.shipping_address)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            items: Set(serde_json::to_value(&snapshot)
                .map_err(|e| ServiceError::InternalError(e.to_string()))?),
            currency: Set(self.base_currency.clone()),
            total: Set(total),
            payment_status: Set("paid".to_string()),
            payment_reference: Set(Some(payment_reference)),
            created_at: Set(Utc::now()),
        };

        let order = order.insert(&*self.db).await?;

        self.cart_service.clear(owner).await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced(order_id))
            .await;

        info!(
            "Placed order {} ({} lines, total {})",
            order.order_number,
            snapshot.len(),
            total
        );
        Ok(order)
    }

    /// Stand-in for a payment gateway: waits the configured fixed delay
    /// and approves unconditionally, returning a payment reference.
    async fn process_mock_payment(&self, amount: Decimal) -> Result<String, ServiceError> {
        info!("Processing payment of {} {}", amount, self.base_currency);
        tokio::time::sleep(self.payment_delay).await;

        Ok(format!("MOCK-{}", Uuid::new_v4()))
    }
}

/// Checkout form data.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlaceOrderInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub recipient_name: String,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country_code: String,
    pub phone: Option<String>,
}
