use super::types::{Column, SortDirection, SortSpec};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"col:dir,col:dir"`. Tokens naming a column outside the sort
    /// allow-list are dropped, never reported.
    pub fn parse(order: &str) -> Vec<SortSpec> {
        let mut out = Vec::new();
        for part in order.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let mut it = trimmed.splitn(2, ':');
            let col = it.next().unwrap_or("").trim();
            let direction = it.next().map(SortDirection::parse).unwrap_or_default();
            match Column::from_sort_key(col) {
                Some(column) => out.push(SortSpec { column, direction }),
                None => tracing::debug!("Dropping sort token with unknown column: {}", col),
            }
        }
        out
    }

    pub fn generate(specs: &[SortSpec]) -> String {
        if specs.is_empty() { return String::new(); }
        let parts: Vec<String> = specs
            .iter()
            .map(|s| format!("{} {}", s.column.quoted(), s.direction.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
