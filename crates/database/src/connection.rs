use crate::error::DbError;
use configuration::DatabaseSettings;
use dotenvy::dotenv;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::env;
use std::time::Duration;

/// Pool options derived from the configured sizing.
pub fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
}

/// Establishes a connection pool to the PostgreSQL database.
///
/// This function reads `DATABASE_URL` from the environment (a `.env` file is
/// loaded first when present) and returns a pool owned by the caller. The
/// caller is responsible for closing it with `PgPool::close` on shutdown.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    // The .env file is optional; a real environment variable works just as well.
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = pool_options(settings).connect(&database_url).await?;
    tracing::info!(
        max_connections = settings.max_connections,
        "Connected to the database"
    );

    Ok(pool)
}

/// A utility function to run database migrations automatically.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
