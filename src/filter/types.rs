use serde_json::Value;

/// Columns of the member table. Generated SQL only ever names these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    EventSlug,
    Seq,
    Name,
    PowerM,
    Gold,
    WishSlot,
    Seat,
    Note,
    UpdatedAt,
}

impl Column {
    /// Every column in table order
    pub const ALL: [Column; 9] = [
        Column::EventSlug,
        Column::Seq,
        Column::Name,
        Column::PowerM,
        Column::Gold,
        Column::WishSlot,
        Column::Seat,
        Column::Note,
        Column::UpdatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::EventSlug => "event_slug",
            Column::Seq => "seq",
            Column::Name => "name",
            Column::PowerM => "power_m",
            Column::Gold => "gold",
            Column::WishSlot => "wish_slot",
            Column::Seat => "seat",
            Column::Note => "note",
            Column::UpdatedAt => "updated_at",
        }
    }

    /// Resolve a client-supplied sort key against the sort allow-list.
    /// Accepts the column name and its camelCase alias.
    pub fn from_sort_key(key: &str) -> Option<Column> {
        match key {
            "seq" => Some(Column::Seq),
            "name" => Some(Column::Name),
            "power_m" | "power_metric" | "powerMetric" => Some(Column::PowerM),
            "gold" | "currency" => Some(Column::Gold),
            "wish_slot" | "wishSlot" => Some(Column::WishSlot),
            "seat" => Some(Column::Seat),
            "updated_at" | "updatedAt" => Some(Column::UpdatedAt),
            _ => None,
        }
    }

    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than `desc` (case-insensitive) sorts ascending
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Column,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: Column, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn asc(column: Column) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn desc(column: Column) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}

/// A single WHERE predicate. All predicates of a filter are AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq { column: Column, value: Value },
    In { column: Column, values: Vec<Value> },
    /// Case-insensitive substring match, OR-ed across `columns`
    ContainsAny { columns: Vec<Column>, text: String },
}

/// Row window: `offset` rows skipped, at most `limit` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub offset: i64,
    pub limit: i64,
}

impl Range {
    /// Build from an inclusive `[from, to]` row interval
    pub fn inclusive(from: i64, to: i64) -> Self {
        Self {
            offset: from.max(0),
            limit: (to - from + 1).max(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
