mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::ProcuraClient;
use output::{OutputConfig, OutputFormat};
use procura::config;
use std::process;

/// CLI for the Procura brokerage server
#[derive(Parser, Debug)]
#[clap(name = "procura-cli", about = "CLI for the Procura sourcing server")]
struct Cli {
    /// Server URL to connect to
    #[clap(
        long,
        env = "PROCURA_URL",
        global = true
    )]
    server_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage projects
    #[command(subcommand)]
    Project(commands::project::ProjectCommands),
    /// Manage requests for quotation
    #[command(subcommand)]
    Request(commands::request::RequestCommands),
    /// Review and forward supplier quotes
    #[command(subcommand)]
    Quote(commands::quote::QuoteCommands),
    /// Browse and compare archived quotations
    #[command(subcommand)]
    Quotation(commands::quotation::QuotationCommands),
    /// Manage exchange rates
    #[command(subcommand)]
    Rate(commands::rate::RateCommands),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > port in the config file > port 3000
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    let port = config::get_config_dir_path()
        .and_then(|dir| config::config_from_file(Some(dir.join("config.toml"))).ok())
        .and_then(|update| update.port)
        .unwrap_or(3000);
    format!("http://localhost:{}", port)
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!(
            "Could not connect to server. Is procura running?\n  {}",
            err_string
        );
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = ProcuraClient::new(server_url);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Project(cmd) => commands::project::execute(&client, cmd, &output_config).await,
        Commands::Request(cmd) => commands::request::execute(&client, cmd, &output_config).await,
        Commands::Quote(cmd) => commands::quote::execute(&client, cmd, &output_config).await,
        Commands::Quotation(cmd) => commands::quotation::execute(&client, cmd, &output_config).await,
        Commands::Rate(cmd) => commands::rate::execute(&client, cmd, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
