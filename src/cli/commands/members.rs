use anyhow::{bail, Context};
use clap::Args;
use serde_json::{json, Value};
use std::io::Read;

use crate::cli::client::RosterClient;
use crate::cli::utils::{cell, output_success, render_table};
use crate::cli::OutputFormat;
use crate::filter::Column;

#[derive(Debug, Default, Args)]
pub struct ListArgs {
    #[arg(long, help = "1-based page number")]
    pub page: Option<u32>,

    #[arg(long, help = "Rows per page (server clamps to 5..=100)")]
    pub size: Option<u32>,

    #[arg(long, help = "Case-insensitive match on name, wish slot, seat or note")]
    pub search: Option<String>,

    #[arg(long, help = "Sort keys, e.g. power_m:desc,name:asc")]
    pub sort: Option<String>,
}

impl ListArgs {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size", size.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(sort) = &self.sort {
            query.push(("sort", sort.clone()));
        }
        query
    }
}

pub async fn list(
    client: &RosterClient,
    event: &str,
    args: &ListArgs,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let body = client.list(event, &args.query()).await?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
        OutputFormat::Text => {
            let headers: Vec<&str> = Column::ALL
                .iter()
                .filter(|c| !matches!(c, Column::EventSlug))
                .map(|c| c.as_str())
                .collect();
            let rows: Vec<Vec<String>> = body
                .get("rows")
                .and_then(Value::as_array)
                .map(|rows| {
                    rows.iter()
                        .map(|row| headers.iter().map(|h| cell(row.get(*h))).collect())
                        .collect()
                })
                .unwrap_or_default();

            if rows.is_empty() {
                println!("No members found");
            } else {
                println!("{}", render_table(&headers, &rows));
            }
            println!(
                "page {} (size {}), {} total",
                cell(body.get("page")),
                cell(body.get("size")),
                cell(body.get("total"))
            );
        }
    }
    Ok(())
}

pub async fn upsert(
    client: &RosterClient,
    event: &str,
    file: &str,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let raw = read_input(file)?;
    let input: Value = serde_json::from_str(&raw).context("input is not valid JSON")?;
    let body = mutation_body(input)?;
    let count = body["upserts"].as_array().map_or(0, Vec::len);

    client.mutate(event, &body).await?;
    output_success(
        output_format,
        &format!("Upserted {} member(s) into '{}'", count, event),
        Some(json!({ "event": event, "upserted": count })),
    )
}

pub async fn delete(
    client: &RosterClient,
    event: &str,
    seqs: &[i64],
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let deletes: Vec<Value> = seqs.iter().map(|seq| json!({ "seq": seq })).collect();
    client.mutate(event, &json!({ "deletes": deletes })).await?;
    output_success(
        output_format,
        &format!("Deleted {} member(s) from '{}'", seqs.len(), event),
        Some(json!({ "event": event, "deleted": seqs })),
    )
}

/// Accepts either a bare array of rows or a full `{upserts, deletes}` body
pub fn mutation_body(input: Value) -> anyhow::Result<Value> {
    match input {
        Value::Array(rows) => Ok(json!({ "upserts": rows })),
        Value::Object(map) if map.contains_key("upserts") || map.contains_key("deletes") => {
            Ok(Value::Object(map))
        }
        Value::Object(map) => Ok(json!({ "upserts": [Value::Object(map)] })),
        _ => bail!("expected an array of members or an object with upserts/deletes"),
    }
}

fn read_input(file: &str) -> anyhow::Result<String> {
    if file == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_becomes_upserts() {
        let body = mutation_body(json!([{ "seq": 1, "name": "A" }])).unwrap();
        assert_eq!(body, json!({ "upserts": [{ "seq": 1, "name": "A" }] }));
    }

    #[test]
    fn full_body_passes_through() {
        let input = json!({ "upserts": [], "deletes": [{ "seq": 3 }] });
        assert_eq!(mutation_body(input.clone()).unwrap(), input);
    }

    #[test]
    fn single_row_object_is_wrapped() {
        let body = mutation_body(json!({ "seq": 2 })).unwrap();
        assert_eq!(body, json!({ "upserts": [{ "seq": 2 }] }));
    }

    #[test]
    fn scalar_input_is_rejected() {
        assert!(mutation_body(json!(42)).is_err());
    }

    #[test]
    fn list_query_only_carries_given_flags() {
        let args = ListArgs {
            page: Some(2),
            sort: Some("name:desc".into()),
            ..Default::default()
        };
        assert_eq!(
            args.query(),
            vec![("page", "2".to_string()), ("sort", "name:desc".to_string())]
        );
    }
}
