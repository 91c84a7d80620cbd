use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::database::record::MemberRecord;
use crate::database::store::{MemberStore, Page, StoreError};
use crate::filter::{Column, Filter};
use crate::roster::params::ListParams;
use crate::roster::payload::MutationBatch;

/// Columns the free-text search looks in
pub const SEARCH_COLUMNS: [Column; 4] = [Column::Name, Column::WishSlot, Column::Seat, Column::Note];

/// Row counts from one applied mutation request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    pub upserted: u64,
    pub deleted: u64,
}

/// Turns normalized requests into store calls. The only component that
/// talks to the store.
#[derive(Clone)]
pub struct Planner {
    store: Arc<dyn MemberStore>,
    table_name: String,
}

impl Planner {
    pub fn new(store: Arc<dyn MemberStore>, table_name: impl Into<String>) -> Result<Self, StoreError> {
        let table_name = table_name.into();
        Filter::validate_table_name(&table_name)?;
        Ok(Self { store, table_name })
    }

    pub fn list_filter(&self, event_slug: &str, params: &ListParams) -> Result<Filter, StoreError> {
        let mut filter = Filter::new(&self.table_name)?.where_eq(Column::EventSlug, event_slug);
        if let Some(search) = &params.search {
            filter = filter.where_contains_any(&SEARCH_COLUMNS, search.as_str());
        }
        Ok(filter.order(&params.sort).range(params.range())?)
    }

    pub fn delete_filter(&self, event_slug: &str, seqs: &[i64]) -> Result<Filter, StoreError> {
        let values: Vec<Value> = seqs.iter().map(|s| Value::from(*s)).collect();
        Ok(Filter::new(&self.table_name)?
            .where_eq(Column::EventSlug, event_slug)
            .where_in(Column::Seq, values))
    }

    pub async fn list(&self, event_slug: &str, params: &ListParams) -> Result<Page<MemberRecord>, StoreError> {
        let filter = self.list_filter(event_slug, params)?;
        debug!(event = event_slug, page = params.page, size = params.size, "listing members");
        self.store.select(&filter).await
    }

    /// Upsert batch, then delete batch. A failed upsert stops the request
    /// before any delete is issued; nothing already written is rolled back.
    pub async fn apply(&self, event_slug: &str, batch: MutationBatch) -> Result<MutationOutcome, StoreError> {
        let mut outcome = MutationOutcome::default();

        if !batch.upserts.is_empty() {
            let rows: Vec<MemberRecord> = batch
                .upserts
                .into_iter()
                .map(|draft| draft.into_record(event_slug, Utc::now()))
                .collect();
            outcome.upserted = self.store.upsert(&rows).await?;
        }

        if !batch.deletes.is_empty() {
            let filter = self.delete_filter(event_slug, &batch.deletes)?;
            outcome.deleted = self.store.delete(&filter).await?;
        }

        info!(
            event = event_slug,
            upserted = outcome.upserted,
            deleted = outcome.deleted,
            "applied member mutations"
        );
        Ok(outcome)
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }
}
