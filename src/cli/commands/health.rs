use crate::cli::client::RosterClient;
use crate::cli::utils::{cell, output_success};
use crate::cli::OutputFormat;

pub async fn handle(client: &RosterClient, output_format: &OutputFormat) -> anyhow::Result<()> {
    let body = client.health().await?;
    let message = format!("Server healthy at {}", cell(body.get("timestamp")));
    output_success(output_format, &message, Some(body))
}
