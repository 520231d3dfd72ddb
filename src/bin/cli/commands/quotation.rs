use clap::Subcommand;
use std::path::PathBuf;

use crate::client::{ProcuraClient, QuotationFilters};
use crate::output::{self, OutputConfig};

/// The archive of supplier prices
#[derive(Subcommand, Debug)]
pub enum QuotationCommands {
    /// List archived quotations
    List {
        /// Substring of the material name
        #[clap(long)]
        material: Option<String>,
        /// Substring of the supplier company, name or email
        #[clap(long)]
        supplier: Option<String>,
        /// Supplier country; repeat to match several
        #[clap(long = "country")]
        countries: Vec<String>,
        #[clap(long)]
        category: Option<String>,
        /// created_at, unit_price, material_name or supplier_country
        #[clap(long)]
        sort_by: Option<String>,
        /// asc or desc
        #[clap(long)]
        order: Option<String>,
        #[clap(long)]
        limit: Option<i64>,
    },
    /// Compare prices per material across suppliers
    Compare {
        /// Substring of the material name
        #[clap(long)]
        search: Option<String>,
        #[clap(long)]
        category: Option<String>,
    },
    /// Summary counts of the archive
    Stats,
    /// Write the comparison as CSV
    Export {
        /// Output file; standard output when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

/// Executes a quotation command
pub async fn execute(
    client: &ProcuraClient,
    cmd: QuotationCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        QuotationCommands::List {
            material,
            supplier,
            countries,
            category,
            sort_by,
            order,
            limit,
        } => {
            let filters = QuotationFilters {
                material,
                supplier,
                countries,
                category,
                sort_by,
                sort_order: order,
                limit,
            };
            let page = client.list_quotations(&filters).await?;
            output::print_quotations(&page.data, page.total, config);
        }
        QuotationCommands::Compare { search, category } => {
            let listing = client
                .quotation_comparison(search.as_deref(), category.as_deref())
                .await?;
            output::print_comparisons(&listing.data, config);
        }
        QuotationCommands::Stats => {
            let stats = client.quotation_stats().await?;
            output::print_stats(&stats, config);
        }
        QuotationCommands::Export { output: path } => {
            let csv = client.export_comparison().await?;
            match path {
                Some(path) => {
                    std::fs::write(&path, csv)?;
                    output::print_success(&format!("Wrote {}", path.display()), config);
                }
                None => println!("{}", csv),
            }
        }
    }
    Ok(())
}
