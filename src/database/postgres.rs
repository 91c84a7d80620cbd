use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgArguments, FromRow, PgPool, Row};
use tracing::{debug, info};

use crate::database::record::MemberRecord;
use crate::database::store::{MemberStore, Page, StoreError, CONFLICT_KEY};
use crate::filter::{Column, Filter};

/// Postgres-backed member store
pub struct PgStore {
    pool: PgPool,
    table_name: String,
}

impl PgStore {
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Result<Self, StoreError> {
        let table_name = table_name.into();
        Filter::validate_table_name(&table_name)?;
        Ok(Self { pool, table_name })
    }

    /// Batch upsert through UNNEST so the statement has a fixed nine binds
    /// regardless of row count
    fn upsert_sql(&self) -> String {
        let columns: Vec<&str> = Column::ALL.iter().map(|c| c.as_str()).collect();
        let conflict: Vec<&str> = CONFLICT_KEY.iter().map(|c| c.as_str()).collect();
        let updates: Vec<String> = Column::ALL
            .iter()
            .filter(|c| !CONFLICT_KEY.contains(c))
            .map(|c| format!("{0} = EXCLUDED.{0}", c.as_str()))
            .collect();

        format!(
            "INSERT INTO \"{}\" ({}) \
             SELECT * FROM UNNEST($1::text[], $2::int8[], $3::text[], $4::float8[], $5::float8[], \
             $6::text[], $7::text[], $8::text[], $9::timestamptz[]) \
             ON CONFLICT ({}) DO UPDATE SET {}",
            self.table_name,
            columns.join(", "),
            conflict.join(", "),
            updates.join(", "),
        )
    }
}

#[async_trait]
impl MemberStore for PgStore {
    async fn select(&self, filter: &Filter) -> Result<Page<MemberRecord>, StoreError> {
        let sql_result = filter.to_sql();
        debug!("select: {} {:?}", sql_result.query, sql_result.params);
        let mut q = sqlx::query_as::<_, MemberRecord>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;

        let count_result = filter.to_count_sql();
        let mut q = sqlx::query(&count_result.query);
        for p in count_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let total: i64 = row.try_get("count")?;

        Ok(Page { rows, total })
    }

    async fn upsert(&self, rows: &[MemberRecord]) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut event_slugs = Vec::with_capacity(rows.len());
        let mut seqs = Vec::with_capacity(rows.len());
        let mut names = Vec::with_capacity(rows.len());
        let mut power_ms: Vec<Option<f64>> = Vec::with_capacity(rows.len());
        let mut golds: Vec<Option<f64>> = Vec::with_capacity(rows.len());
        let mut wish_slots: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut seats: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut notes: Vec<Option<String>> = Vec::with_capacity(rows.len());
        let mut updated_ats: Vec<DateTime<Utc>> = Vec::with_capacity(rows.len());
        for r in rows {
            event_slugs.push(r.event_slug.clone());
            seqs.push(r.seq);
            names.push(r.name.clone());
            power_ms.push(r.power_m);
            golds.push(r.gold);
            wish_slots.push(r.wish_slot.clone());
            seats.push(r.seat.clone());
            notes.push(r.note.clone());
            updated_ats.push(r.updated_at);
        }

        let result = sqlx::query(&self.upsert_sql())
            .bind(event_slugs)
            .bind(seqs)
            .bind(names)
            .bind(power_ms)
            .bind(golds)
            .bind(wish_slots)
            .bind(seats)
            .bind(notes)
            .bind(updated_ats)
            .execute(&self.pool)
            .await?;

        info!("Upserted {} rows into {}", result.rows_affected(), self.table_name);
        Ok(result.rows_affected())
    }

    async fn delete(&self, filter: &Filter) -> Result<u64, StoreError> {
        let sql_result = filter.to_delete_sql();
        debug!("delete: {} {:?}", sql_result.query, sql_result.params);
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;
        info!("Deleted {} rows from {}", result.rows_affected(), self.table_name);
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
