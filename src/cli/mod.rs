pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::RosterClient;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Roster CLI - list and edit event members over the roster API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "ROSTER_URL",
        default_value = "http://127.0.0.1:3000",
        help = "Base URL of the roster API"
    )]
    pub server: String,

    #[arg(long, global = true, env = "EDIT_KEY", hide_env_values = true, help = "Edit key sent on mutations")]
    pub edit_key: Option<String>,

    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List one page of an event's members")]
    List {
        event: String,
        #[command(flatten)]
        args: commands::members::ListArgs,
    },

    #[command(about = "Upsert members from a JSON file or stdin")]
    Upsert {
        event: String,
        #[arg(long, short, default_value = "-", help = "JSON file to read, '-' for stdin")]
        file: String,
    },

    #[command(about = "Delete members by seq")]
    Delete {
        event: String,
        #[arg(required = true)]
        seqs: Vec<i64>,
    },

    #[command(about = "Check server and store health")]
    Health,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = RosterClient::new(&cli.server, cli.edit_key.clone())?;

    match cli.command {
        Commands::List { event, args } => {
            commands::members::list(&client, &event, &args, &output_format).await
        }
        Commands::Upsert { event, file } => {
            commands::members::upsert(&client, &event, &file, &output_format).await
        }
        Commands::Delete { event, seqs } => {
            commands::members::delete(&client, &event, &seqs, &output_format).await
        }
        Commands::Health => commands::health::handle(&client, &output_format).await,
    }
}
