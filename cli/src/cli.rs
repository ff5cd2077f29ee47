use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use courier_api::domain::request::{ApiKeyLocation, HttpMethod};

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Courier - compose, send and keep HTTP requests")]
pub struct Cli {
    /// SQLite file holding history, saved requests and variables
    #[arg(long, global = true, env = "COURIER_DB", default_value = "courier.sqlite")]
    pub db: PathBuf,

    /// Request timeout in milliseconds
    #[arg(long, global = true, default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a request
    Send(SendArgs),

    /// Request history commands
    History(HistoryArgs),

    /// Saved request commands
    Saved(SavedArgs),

    /// Environment variable commands
    Env(EnvArgs),

    /// Export saved requests, history and variables to a JSON file
    Export { path: PathBuf },

    /// Replace saved requests, history and variables from an export file
    Import { path: PathBuf },
}

#[derive(Args)]
pub struct SendArgs {
    /// HTTP method
    pub method: HttpMethod,

    /// URL, may contain {{VARIABLE}} placeholders
    pub url: String,

    /// Header as KEY:VALUE, repeatable
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Query parameter as KEY=VALUE, repeatable
    #[arg(short = 'q', long = "param", value_parser = parse_pair)]
    pub params: Vec<(String, String)>,

    /// Bearer token
    #[arg(long, conflicts_with_all = ["basic", "api_key"])]
    pub bearer: Option<String>,

    /// Basic credentials as USER:PASS
    #[arg(long, value_parser = parse_header, conflicts_with = "api_key")]
    pub basic: Option<(String, String)>,

    /// API key as KEY=VALUE
    #[arg(long, value_parser = parse_pair)]
    pub api_key: Option<(String, String)>,

    /// Where the API key goes: header or query
    #[arg(long, default_value = "header")]
    pub api_key_in: ApiKeyLocation,

    /// Raw request body
    #[arg(short = 'd', long = "data")]
    pub body: Option<String>,

    /// Also keep the request under this name
    #[arg(long)]
    pub save: Option<String>,
}

#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommands,
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List history, newest first
    List,
    /// Show one history item as JSON
    Show { id: String },
    /// Remove one history item
    Remove { id: String },
    /// Remove every history item
    Clear,
    /// Send a history item again
    Resend { id: String },
}

#[derive(Args)]
pub struct SavedArgs {
    #[command(subcommand)]
    pub command: SavedCommands,
}

#[derive(Subcommand)]
pub enum SavedCommands {
    /// List saved requests
    List,
    /// Show one saved request as JSON
    Show { id: String },
    /// Delete a saved request
    Delete { id: String },
    /// Send a saved request
    Send { id: String },
}

#[derive(Args)]
pub struct EnvArgs {
    #[command(subcommand)]
    pub command: EnvCommands,
}

#[derive(Subcommand)]
pub enum EnvCommands {
    /// List variables
    List,
    /// Add or replace a variable
    Set { key: String, value: String },
    /// Remove a variable
    Unset { key: String },
    /// Enable or disable a variable
    Toggle { key: String },
}

fn split_once_on(raw: &str, separator: char) -> Result<(String, String), String> {
    raw.split_once(separator)
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY{separator}VALUE, got {raw}"))
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    split_once_on(raw, ':')
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    split_once_on(raw, '=')
}
