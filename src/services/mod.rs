/// Storefront services module - core business logic
pub mod carts;
pub mod catalog;
pub mod checkout;

use crate::{config::AppConfig, events::EventSender};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

// Re-export services for convenience
pub use carts::{CartLine, CartOwner, CartService, CartSummary};
pub use catalog::CatalogService;
pub use checkout::{CheckoutService, PlaceOrderInput, ShippingAddress};

/// Aggregated services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub carts: CartService,
    pub catalog: CatalogService,
    pub checkout: CheckoutService,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        let carts = CartService::new(db.clone(), event_sender.clone());
        let catalog = CatalogService::new(db.clone());
        let checkout = CheckoutService::new(
            db,
            event_sender,
            carts.clone(),
            config.base_currency.clone(),
            Duration::from_millis(config.mock_payment_delay_ms),
        );

        Self {
            carts,
            catalog,
            checkout,
        }
    }
}
