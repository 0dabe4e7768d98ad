//! NutriPaw Storefront Library
//!
//! Backend for the NutriPaw bilingual pet-food brand site: product
//! catalog reads, owner-keyed shopping carts, render-time currency
//! display, and a simplified checkout, plus the client-side state types
//! (cart presentation cache, favorites store) the UI shell uses.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod currency;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod localized;
pub mod migrator;
pub mod services;
pub mod state;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services =
            services::AppServices::new(db.clone(), Arc::new(event_sender.clone()), &config);
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// Builds the `/api/v1` route tree.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/products", handlers::products_routes())
        .nest("/cart", handlers::cart_routes())
        .nest("/checkout", handlers::checkout_routes())
}
