use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::store::StoreError;

/// Builds the process-wide connection pool. The pool is created once at
/// start-up and handed to the store; nothing here is global.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let connection_string = Self::build_connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!("Created database pool for: {}", Self::redacted(&connection_string));
        Ok(pool)
    }

    /// DATABASE_URL with the service credential spliced in, when one is
    /// configured separately from the URL
    pub fn build_connection_string(config: &DatabaseConfig) -> Result<String, StoreError> {
        let base = config.url.as_deref().ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let mut url = url::Url::parse(base).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        if let Some(password) = config.password.as_deref() {
            url.set_password(Some(password)).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }

    /// Connection string safe to log
    fn redacted(connection_string: &str) -> String {
        match url::Url::parse(connection_string) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.into()
            }
            Err(_) => "<unparseable>".to_string(),
        }
    }
}
