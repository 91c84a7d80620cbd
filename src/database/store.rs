use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::database::record::MemberRecord;
use crate::filter::{Column, Filter, FilterError};

/// Conflict key for batch upserts
pub const CONFLICT_KEY: [Column; 2] = [Column::EventSlug, Column::Seq];

/// Errors from the row store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    /// The store refused the statement (constraint, type, syntax)
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => StoreError::Rejected(db.message().to_string()),
            other => StoreError::Sqlx(other),
        }
    }
}

/// One page of rows plus the exact size of the filtered set
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: i64,
}

/// Tabular store for member rows. Implementations never retry and never
/// partially apply a failed batch.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Filtered, ordered, ranged fetch with an exact total count
    async fn select(&self, filter: &Filter) -> Result<Page<MemberRecord>, StoreError>;

    /// Insert or fully overwrite rows, keyed on [`CONFLICT_KEY`]
    async fn upsert(&self, rows: &[MemberRecord]) -> Result<u64, StoreError>;

    /// Physically delete every row matching the filter's conditions
    async fn delete(&self, filter: &Filter) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Release connections on process shutdown
    async fn close(&self) {}
}
