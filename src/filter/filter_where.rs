use serde_json::Value;

use super::types::Condition;

/// Renders conditions to a parameterized WHERE body. Values never appear in
/// the SQL text; they are returned in placeholder order.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(starting_param_index);
        let parts: Vec<String> = conditions.iter().map(|c| filter_where.build_sql_condition(c)).collect();
        let where_clause = if parts.is_empty() { "1=1".to_string() } else { parts.join(" AND ") };
        (where_clause, filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Eq { column, value } => {
                if value.is_null() { format!("{} IS NULL", column.quoted()) }
                else { format!("{} = {}", column.quoted(), self.param(value.clone())) }
            }
            Condition::In { column, values } => {
                if values.is_empty() { return "1=0".to_string(); }
                let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                format!("{} IN ({})", column.quoted(), params.join(", "))
            }
            Condition::ContainsAny { columns, text } => {
                if columns.is_empty() { return "1=0".to_string(); }
                // One bound pattern, referenced by every column
                let placeholder = self.param(Value::String(format!("%{}%", escape_like(text))));
                let parts: Vec<String> = columns
                    .iter()
                    .map(|c| format!("{} ILIKE {}", c.quoted(), placeholder))
                    .collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escape LIKE metacharacters so user text only ever matches literally
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') { out.push('\\'); }
        out.push(c);
    }
    out
}
