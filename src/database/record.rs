use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::filter::Column;

/// One row of the member table, keyed by `(event_slug, seq)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberRecord {
    pub event_slug: String,
    pub seq: i64,
    pub name: String,
    pub power_m: Option<f64>,
    pub gold: Option<f64>,
    pub wish_slot: Option<String>,
    pub seat: Option<String>,
    pub note: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl MemberRecord {
    pub fn key(&self) -> (String, i64) {
        (self.event_slug.clone(), self.seq)
    }

    /// Column value in the same JSON shape the filter binds
    pub fn value(&self, column: Column) -> Value {
        match column {
            Column::EventSlug => Value::from(self.event_slug.as_str()),
            Column::Seq => Value::from(self.seq),
            Column::Name => Value::from(self.name.as_str()),
            Column::PowerM => self.power_m.map(Value::from).unwrap_or(Value::Null),
            Column::Gold => self.gold.map(Value::from).unwrap_or(Value::Null),
            Column::WishSlot => self.wish_slot.clone().map(Value::from).unwrap_or(Value::Null),
            Column::Seat => self.seat.clone().map(Value::from).unwrap_or(Value::Null),
            Column::Note => self.note.clone().map(Value::from).unwrap_or(Value::Null),
            Column::UpdatedAt => Value::from(self.updated_at.to_rfc3339()),
        }
    }

    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::EventSlug => Some(&self.event_slug),
            Column::Name => Some(&self.name),
            Column::WishSlot => self.wish_slot.as_deref(),
            Column::Seat => self.seat.as_deref(),
            Column::Note => self.note.as_deref(),
            _ => None,
        }
    }

    /// Ascending comparison on one column. NULLs sort after every value,
    /// matching Postgres' default ordering.
    pub fn compare(&self, other: &Self, column: Column) -> Ordering {
        match column {
            Column::EventSlug => self.event_slug.cmp(&other.event_slug),
            Column::Seq => self.seq.cmp(&other.seq),
            Column::Name => self.name.cmp(&other.name),
            Column::PowerM => nulls_last(&self.power_m, &other.power_m, |a, b| a.total_cmp(b)),
            Column::Gold => nulls_last(&self.gold, &other.gold, |a, b| a.total_cmp(b)),
            Column::WishSlot => nulls_last(&self.wish_slot, &other.wish_slot, Ord::cmp),
            Column::Seat => nulls_last(&self.seat, &other.seat, Ord::cmp),
            Column::Note => nulls_last(&self.note, &other.note, Ord::cmp),
            Column::UpdatedAt => self.updated_at.cmp(&other.updated_at),
        }
    }
}

fn nulls_last<T>(a: &Option<T>, b: &Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
