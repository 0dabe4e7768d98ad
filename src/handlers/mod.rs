pub mod carts;
pub mod checkout;
/// Storefront API handlers module
pub mod common;
pub mod products;

// Re-export route builders
pub use carts::cart_routes;
pub use checkout::checkout_routes;
pub use products::products_routes;
