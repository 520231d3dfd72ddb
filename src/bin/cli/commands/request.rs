use clap::Subcommand;
use procura::dto::CreateSupplierRequestDto;

use crate::client::ProcuraClient;
use crate::output::{self, OutputConfig};

/// Requests for quotation
#[derive(Subcommand, Debug)]
pub enum RequestCommands {
    /// Send a project out for quotation
    Create {
        /// The project ID
        project_id: String,
        /// The owning tenant
        #[clap(long, env = "PROCURA_OWNER_ID")]
        owner: String,
        /// Number of suppliers to contact
        #[clap(long)]
        suppliers: Option<i32>,
        /// Country to source from
        #[clap(long)]
        country: Option<String>,
        /// Shipping mode, e.g. "sea" or "air"
        #[clap(long)]
        shipping: Option<String>,
        #[clap(long)]
        notes: Option<String>,
        /// Days before the public link stops accepting quotes
        #[clap(long)]
        expires_in_days: Option<i64>,
    },
    /// List requests, newest first
    List {
        /// Only the requests of this owner
        #[clap(long)]
        owner: Option<String>,
    },
    /// Show a request with its progress
    Get {
        /// The request ID
        id: String,
    },
    /// List the personal links handed to suppliers
    Links {
        /// The request ID
        id: String,
    },
    /// Hand out more supplier links
    AddLinks {
        /// The request ID
        id: String,
        /// How many links to add
        #[clap(long)]
        count: Option<i32>,
    },
    /// Refresh the request from the project's current materials
    Sync {
        /// The request ID
        id: String,
    },
}

/// Executes a request command
pub async fn execute(
    client: &ProcuraClient,
    cmd: RequestCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RequestCommands::Create {
            project_id,
            owner,
            suppliers,
            country,
            shipping,
            notes,
            expires_in_days,
        } => {
            let dto = CreateSupplierRequestDto {
                owner_id: owner,
                num_suppliers: suppliers,
                country,
                shipping_type: shipping,
                notes,
                expires_in_days,
            };
            let request = client.create_request(&project_id, &dto).await?;
            output::print_request(&request, config);
        }
        RequestCommands::List { owner } => {
            let requests = client.list_requests(owner.as_deref()).await?;
            output::print_requests(&requests, config);
        }
        RequestCommands::Get { id } => {
            let request = client.get_request(&id).await?;
            output::print_request(&request, config);
        }
        RequestCommands::Links { id } => {
            let links = client.list_links(&id).await?;
            output::print_links(&links.data, config);
        }
        RequestCommands::AddLinks { id, count } => {
            let links = client.add_links(&id, count).await?;
            output::print_links(&links.data, config);
        }
        RequestCommands::Sync { id } => {
            let summary = client.sync_request(&id).await?;
            output::print_sync_summary(&summary, config);
        }
    }
    Ok(())
}
