use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::migrator::Migrator;

pub type DbPool = DatabaseConnection;

/// Establishes a pooled database connection from application configuration.
pub async fn establish_connection(cfg: &AppConfig) -> Result<DatabaseConnection, ServiceError> {
    let mut opts = ConnectOptions::new(cfg.database_url.clone());
    opts.max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_connections)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let db = Database::connect(opts).await?;
    info!("database connection established");
    Ok(db)
}

/// Applies all pending migrations.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), ServiceError> {
    Migrator::up(db, None).await?;
    info!("database migrations applied");
    Ok(())
}
