use clap::Subcommand;

use crate::client::ProcuraClient;
use crate::output::{self, OutputConfig};

/// Supplier quotes and their forwarding to clients
#[derive(Subcommand, Debug)]
pub enum QuoteCommands {
    /// List quotes, newest first
    List {
        /// Only the quotes answering this request
        #[clap(long)]
        request: Option<String>,
    },
    /// Show a quote line by line
    Get {
        /// The quote ID
        id: String,
    },
    /// Record the margin planned for a quote
    Margin {
        /// The quote ID
        id: String,
        /// Margin in percent
        #[clap(allow_negative_numbers = true)]
        percent: f64,
    },
    /// Forward a quote to the client with a margin applied to every line
    Send {
        /// The quote ID
        id: String,
        /// Margin in percent
        #[clap(long, default_value_t = 0.0, allow_negative_numbers = true)]
        margin: f64,
    },
}

/// Executes a quote command
pub async fn execute(
    client: &ProcuraClient,
    cmd: QuoteCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        QuoteCommands::List { request } => {
            let quotes = client.list_quotes(request.as_deref()).await?;
            output::print_quotes(&quotes, config);
        }
        QuoteCommands::Get { id } => {
            let quote = client.get_quote(&id).await?;
            output::print_quote(&quote, config);
        }
        QuoteCommands::Margin { id, percent } => {
            let quote = client.set_quote_margin(&id, percent).await?;
            output::print_quote(&quote, config);
        }
        QuoteCommands::Send { id, margin } => {
            let summary = client.send_quote(&id, margin).await?;
            output::print_send_summary(&summary, config);
        }
    }
    Ok(())
}
