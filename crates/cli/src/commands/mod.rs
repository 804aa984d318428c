//! Subcommand implementations.

pub mod migrate;
pub mod orders;
pub mod seed;
pub mod users;

use secrecy::SecretString;
use sqlx::PgPool;

/// Errors shared by the commands that talk to `PostgreSQL` directly.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseSetupError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the database named by `DATABASE_URL`, reading `.env` first.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the connection fails.
pub async fn connect() -> Result<PgPool, DatabaseSetupError> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| DatabaseSetupError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(spice_hub_api::db::create_pool(&database_url).await?)
}
