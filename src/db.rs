use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

use crate::{config::AppConfig, errors::ServiceError};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool from the application configuration.
pub async fn connect(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let mut opt = ConnectOptions::new(cfg.database_url.clone());

    opt.max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_connections)
        .connect_timeout(Duration::from_secs(cfg.db_connect_timeout_secs))
        .sqlx_logging(false);

    info!(
        "Connecting to database with max_connections={}",
        cfg.db_max_connections
    );

    let pool = Database::connect(opt).await?;
    Ok(pool)
}

/// Runs the embedded migrations to the latest version.
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    crate::migrator::Migrator::up(pool, None).await?;

    info!("Migrations completed in {:?}", start.elapsed());
    Ok(())
}
