use clap::Subcommand;

use crate::client::ProcuraClient;
use crate::output::{self, OutputConfig};

/// Project management commands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List the projects of an owner, most recently updated first
    List {
        /// The owning tenant
        #[clap(long, env = "PROCURA_OWNER_ID")]
        owner: String,
        #[clap(long, default_value_t = 1)]
        page: i64,
        #[clap(long, default_value_t = 20)]
        limit: i64,
    },
    /// Create a new project
    Create {
        /// The owning tenant
        #[clap(long, env = "PROCURA_OWNER_ID")]
        owner: String,
        /// The project name
        #[clap(long)]
        name: String,
        /// Kind of construction work
        #[clap(long = "type")]
        project_type: Option<String>,
    },
    /// Show a project
    Get {
        /// The project ID
        id: String,
    },
    /// List the materials of a project
    Materials {
        /// The project ID
        id: String,
    },
    /// Delete a project and everything attached to it
    Delete {
        /// The project ID
        id: String,
    },
}

/// Executes a project command
pub async fn execute(
    client: &ProcuraClient,
    cmd: ProjectCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ProjectCommands::List { owner, page, limit } => {
            let listing = client.list_projects(&owner, page, limit).await?;
            output::print_projects(&listing.data, listing.total, config);
        }
        ProjectCommands::Create { owner, name, project_type } => {
            let project = client.create_project(owner, name, project_type).await?;
            output::print_project(&project, config);
        }
        ProjectCommands::Get { id } => {
            let project = client.get_project(&id).await?;
            output::print_project(&project, config);
        }
        ProjectCommands::Materials { id } => {
            let materials = client.list_materials(&id).await?;
            output::print_materials(&materials, config);
        }
        ProjectCommands::Delete { id } => {
            client.delete_project(&id).await?;
            output::print_success(&format!("Deleted project {}", id), config);
        }
    }
    Ok(())
}
