//! In-process member store.
//!
//! Evaluates the same [`Filter`] the Postgres store renders to SQL, with the
//! same ordering rules, so handlers behave identically on either backend.
//! Backs the integration tests and `roster-api --memory`.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

use crate::database::record::MemberRecord;
use crate::database::store::{MemberStore, Page, StoreError};
use crate::filter::{Condition, Filter, SortDirection};

#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<BTreeMap<(String, i64), MemberRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Snapshot of every stored row in key order
    pub async fn snapshot(&self) -> Vec<MemberRecord> {
        self.rows.read().await.values().cloned().collect()
    }
}

fn matches(conditions: &[Condition], record: &MemberRecord) -> bool {
    conditions.iter().all(|condition| match condition {
        Condition::Eq { column, value } => record.value(*column) == *value,
        Condition::In { column, values } => values.contains(&record.value(*column)),
        Condition::ContainsAny { columns, text } => {
            let needle = text.to_lowercase();
            columns
                .iter()
                .filter_map(|c| record.text(*c))
                .any(|haystack| haystack.to_lowercase().contains(&needle))
        }
    })
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn select(&self, filter: &Filter) -> Result<Page<MemberRecord>, StoreError> {
        let rows = self.rows.read().await;
        let mut selected: Vec<MemberRecord> = rows
            .values()
            .filter(|r| matches(filter.conditions(), r))
            .cloned()
            .collect();
        drop(rows);

        let specs = filter.sort_specs();
        selected.sort_by(|a, b| {
            specs
                .iter()
                .map(|spec| {
                    let ord = a.compare(b, spec.column);
                    match spec.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total = selected.len() as i64;
        let rows = match filter.window() {
            Some(range) => selected
                .into_iter()
                .skip(usize::try_from(range.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(range.limit).unwrap_or(0))
                .collect(),
            None => selected,
        };

        Ok(Page { rows, total })
    }

    async fn upsert(&self, rows: &[MemberRecord]) -> Result<u64, StoreError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for r in rows {
            if !seen.insert(r.key()) {
                return Err(StoreError::Rejected(
                    "ON CONFLICT DO UPDATE command cannot affect row a second time".to_string(),
                ));
            }
        }

        let mut stored = self.rows.write().await;
        for r in rows {
            stored.insert(r.key(), r.clone());
        }
        Ok(rows.len() as u64)
    }

    async fn delete(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut stored = self.rows.write().await;
        let before = stored.len();
        stored.retain(|_, r| !matches(filter.conditions(), r));
        Ok((before - stored.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
