use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Column, Condition, Range, SortSpec, SqlResult};

/// Store-agnostic description of a read or delete against one table.
/// `PgStore` renders it to SQL; `MemoryStore` evaluates it directly.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    conditions: Vec<Condition>,
    order_data: Vec<SortSpec>,
    range: Option<Range>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            conditions: vec![],
            order_data: vec![],
            range: None,
        })
    }

    pub fn where_eq(mut self, column: Column, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq { column, value: value.into() });
        self
    }

    pub fn where_in(mut self, column: Column, values: Vec<Value>) -> Self {
        self.conditions.push(Condition::In { column, values });
        self
    }

    pub fn where_contains_any(mut self, columns: &[Column], text: impl Into<String>) -> Self {
        self.conditions.push(Condition::ContainsAny { columns: columns.to_vec(), text: text.into() });
        self
    }

    /// Successive ordering clauses; earlier specs are the primary keys
    pub fn order(mut self, specs: &[SortSpec]) -> Self {
        self.order_data.extend_from_slice(specs);
        self
    }

    pub fn range(mut self, range: Range) -> Result<Self, FilterError> {
        if range.offset < 0 { return Err(FilterError::InvalidRange("Offset must be non-negative".to_string())); }
        if range.limit < 0 { return Err(FilterError::InvalidRange("Limit must be non-negative".to_string())); }
        self.range = Some(range);
        Ok(self)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn sort_specs(&self) -> &[SortSpec] {
        &self.order_data
    }

    pub fn window(&self) -> Option<Range> {
        self.range
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_clause),
            FilterOrder::generate(&self.order_data),
            self.build_limit_clause(),
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        SqlResult { query, params }
    }

    /// Exact count of the filtered set, ignoring order and range
    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let query = format!("SELECT COUNT(*) as count FROM \"{}\" WHERE {}", self.table_name, where_clause);
        SqlResult { query, params }
    }

    pub fn to_delete_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let query = format!("DELETE FROM \"{}\" WHERE {}", self.table_name, where_clause);
        SqlResult { query, params }
    }

    pub fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let first = chars.next().ok_or_else(|| FilterError::InvalidTableName("Table name cannot be empty".to_string()))?;
        if !(first.is_ascii_alphabetic() || first == '_') || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match self.range {
            Some(r) => format!("LIMIT {} OFFSET {}", r.limit, r.offset),
            None => String::new(),
        }
    }
}
