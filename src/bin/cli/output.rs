use clap::ValueEnum;
use procura::dto::{ConversionDto, SyncSummary};
use procura::models::{
    ExchangeRate, Material, MaterialQuotation, Project, SupplierQuote, SupplierRequest,
    SupplierToken,
};
use procura::pricing::{MaterialComparison, QuotationStats, SendSummary};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render JSON: {}", e),
    }
}

/// Formats an optional value, `-` when absent
fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Prints a list of projects in the specified format
pub fn print_projects(projects: &[Project], total: i64, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if projects.is_empty() {
                if !config.quiet {
                    println!("No projects found.");
                }
                return;
            }
            if config.quiet {
                for project in projects {
                    println!("{}", project.get_id());
                }
                return;
            }
            let max_id = projects.iter().map(|p| p.get_id().len()).max().unwrap_or(2);
            println!("{:<width$}  {:<16}  {:<12}  NAME", "ID", "UPDATED", "TYPE", width = max_id);
            for project in projects {
                println!(
                    "{:<width$}  {:<16}  {:<12}  {}",
                    project.get_id(),
                    project.get_updated_at().format("%Y-%m-%d %H:%M"),
                    or_dash(project.get_project_type()),
                    project.get_name(),
                    width = max_id
                );
            }
            println!("{} of {} projects", projects.len(), total);
        }
        OutputFormat::Json => print_json(projects),
    }
}

/// Prints a single project in the specified format
pub fn print_project(project: &Project, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", project.get_id());
                return;
            }
            println!("ID:       {}", project.get_id());
            println!("Name:     {}", project.get_name());
            println!("Owner:    {}", project.get_owner_id());
            println!("Type:     {}", or_dash(project.get_project_type()));
            println!("Created:  {}", project.get_created_at().format("%Y-%m-%d %H:%M:%S"));
            println!("Updated:  {}", project.get_updated_at().format("%Y-%m-%d %H:%M:%S"));
        }
        OutputFormat::Json => print_json(project),
    }
}

pub fn print_materials(materials: &[Material], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if materials.is_empty() {
                if !config.quiet {
                    println!("No materials found.");
                }
                return;
            }
            if config.quiet {
                for material in materials {
                    println!("{}", material.get_id());
                }
                return;
            }
            let max_id = materials.iter().map(|m| m.get_id().len()).max().unwrap_or(2);
            println!("{:<width$}  {:>10}  {:<6}  {:<20}  NAME", "ID", "QTY", "UNIT", "CATEGORY", width = max_id);
            for material in materials {
                println!(
                    "{:<width$}  {:>10}  {:<6}  {:<20}  {}",
                    material.get_id(),
                    or_dash(material.get_quantity()),
                    or_dash(material.get_unit()),
                    or_dash(material.get_category()),
                    material.get_name(),
                    width = max_id
                );
            }
        }
        OutputFormat::Json => print_json(materials),
    }
}

/// Prints requests for quotation with their progress
pub fn print_requests(requests: &[SupplierRequest], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if requests.is_empty() {
                if !config.quiet {
                    println!("No requests found.");
                }
                return;
            }
            if config.quiet {
                for request in requests {
                    println!("{}", request.get_id());
                }
                return;
            }
            println!("{:<18}  {:<14}  {:>9}  {:<16}  ID", "NUMBER", "STATUS", "FILLED", "EXPIRES");
            for request in requests {
                println!(
                    "{:<18}  {:<14}  {:>9}  {:<16}  {}",
                    request.get_request_number(),
                    request.get_status(),
                    format!("{}/{}", request.get_filled_materials(), request.get_total_materials()),
                    or_dash(request.get_expires_at().map(|at| at.format("%Y-%m-%d %H:%M"))),
                    request.get_id()
                );
            }
        }
        OutputFormat::Json => print_json(requests),
    }
}

pub fn print_request(request: &SupplierRequest, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", request.get_id());
                return;
            }
            println!("ID:        {}", request.get_id());
            println!("Number:    {}", request.get_request_number());
            println!("Project:   {}", request.get_project_id());
            println!("Status:    {}", request.get_status());
            println!("Suppliers: {}", request.get_num_suppliers());
            println!("Country:   {} ({})", request.get_country(), request.get_shipping_type());
            println!("Progress:  {}/{}", request.get_filled_materials(), request.get_total_materials());
            println!("Token:     {}", request.get_public_token());
            println!(
                "Expires:   {}",
                or_dash(request.get_expires_at().map(|at| at.format("%Y-%m-%d %H:%M:%S")))
            );
        }
        OutputFormat::Json => print_json(request),
    }
}

/// Prints the personal links of a request
pub fn print_links(links: &[SupplierToken], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if links.is_empty() {
                if !config.quiet {
                    println!("No links found.");
                }
                return;
            }
            if config.quiet {
                for link in links {
                    println!("{}", link.get_token());
                }
                return;
            }
            println!("{:<10}  {:>5}  {:>7}  {:<24}  TOKEN", "STATUS", "VIEWS", "VERSION", "SUPPLIER");
            for link in links {
                let version = if link.has_pending_updates() {
                    format!("{}*", link.get_materials_version())
                } else {
                    link.get_materials_version().to_string()
                };
                println!(
                    "{:<10}  {:>5}  {:>7}  {:<24}  {}",
                    link.get_status(),
                    link.get_view_count(),
                    version,
                    or_dash(link.display_name()),
                    link.get_token()
                );
            }
        }
        OutputFormat::Json => print_json(links),
    }
}

pub fn print_sync_summary(summary: &SyncSummary, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", summary.version);
                return;
            }
            println!(
                "Now at materials version {}: {} materials changed, {} links updated",
                summary.version, summary.changed_materials, summary.suppliers_synced
            );
        }
        OutputFormat::Json => print_json(summary),
    }
}

/// Prints supplier quotes, newest first as returned by the server
pub fn print_quotes(quotes: &[SupplierQuote], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if quotes.is_empty() {
                if !config.quiet {
                    println!("No quotes found.");
                }
                return;
            }
            if config.quiet {
                for quote in quotes {
                    println!("{}", quote.get_id());
                }
                return;
            }
            let max_id = quotes.iter().map(|q| q.get_id().len()).max().unwrap_or(2);
            println!("{:<width$}  {:<15}  {:>6}  {:>7}  SUPPLIER", "ID", "STATUS", "LINES", "MARGIN", width = max_id);
            for quote in quotes {
                let supplier = quote.get_supplier();
                println!(
                    "{:<width$}  {:<15}  {:>6}  {:>7}  {} <{}> ({})",
                    quote.get_id(),
                    quote.get_status(),
                    quote.get_quoted_materials().len(),
                    or_dash(quote.get_admin_margin().map(|m| format!("{}%", m))),
                    supplier.company.unwrap_or(supplier.name),
                    supplier.email,
                    quote.get_supplier_country(),
                    width = max_id
                );
            }
        }
        OutputFormat::Json => print_json(quotes),
    }
}

pub fn print_quote(quote: &SupplierQuote, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", quote.get_id());
                return;
            }
            let supplier = quote.get_supplier();
            println!("ID:        {}", quote.get_id());
            println!("Request:   {}", quote.get_supplier_request_id());
            println!("Supplier:  {} <{}>", supplier.name, supplier.email);
            println!("Country:   {}", quote.get_supplier_country());
            println!("Status:    {}", quote.get_status());
            println!("Margin:    {}", or_dash(quote.get_admin_margin().map(|m| format!("{}%", m))));
            println!("Submitted: {}", quote.get_submitted_at().format("%Y-%m-%d %H:%M:%S"));
            for line in quote.get_quoted_materials() {
                if !line.has_prices() {
                    println!("  - {}: unavailable", line.name);
                    continue;
                }
                let prices = line
                    .prices
                    .iter()
                    .map(|p| format!("{} {}", p.amount, p.currency))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("  - {}: {}", line.name, prices);
            }
        }
        OutputFormat::Json => print_json(quote),
    }
}

/// Prints what forwarding a quote wrote
pub fn print_send_summary(summary: &SendSummary, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", summary.prices_inserted);
                return;
            }
            println!(
                "Sent quote {}: {} prices for {} materials, {} quotations archived",
                summary.quote_id, summary.prices_inserted, summary.material_count, summary.quotations_archived
            );
            if !summary.unmatched_materials.is_empty() {
                println!("Not in the project: {}", summary.unmatched_materials.join(", "));
            }
        }
        OutputFormat::Json => print_json(summary),
    }
}

pub fn print_quotations(quotations: &[MaterialQuotation], total: i64, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if quotations.is_empty() {
                if !config.quiet {
                    println!("No quotations found.");
                }
                return;
            }
            if config.quiet {
                for quotation in quotations {
                    println!("{}", quotation.get_id());
                }
                return;
            }
            println!("{:<28}  {:>12}  {:<5}  {:>14}  {:<12}  SUPPLIER", "MATERIAL", "PRICE", "CUR", "FCFA", "COUNTRY");
            for quotation in quotations {
                println!(
                    "{:<28}  {:>12.2}  {:<5}  {:>14}  {:<12}  {}",
                    quotation.get_material_name(),
                    quotation.get_unit_price(),
                    quotation.get_currency(),
                    or_dash(quotation.get_converted_price_fcfa().map(|p| format!("{:.0}", p))),
                    or_dash(quotation.get_supplier_country()),
                    quotation.get_supplier_company().unwrap_or_else(|| quotation.get_supplier_email())
                );
            }
            println!("{} of {} quotations", quotations.len(), total);
        }
        OutputFormat::Json => print_json(quotations),
    }
}

/// Prints the per-material comparison, lowest price first as returned
pub fn print_comparisons(comparisons: &[MaterialComparison], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if comparisons.is_empty() {
                if !config.quiet {
                    println!("No quotations to compare.");
                }
                return;
            }
            if config.quiet {
                println!("{}", comparisons.len());
                return;
            }
            println!("{:<28}  {:>9}  {:>12}  {:>12}  {:>12}  CUR", "MATERIAL", "SUPPLIERS", "LOWEST", "AVERAGE", "HIGHEST");
            for c in comparisons {
                println!(
                    "{:<28}  {:>9}  {:>12.2}  {:>12.2}  {:>12.2}  {}",
                    c.material_name, c.supplier_count, c.lowest_price, c.avg_price, c.highest_price, c.most_common_currency
                );
            }
        }
        OutputFormat::Json => print_json(comparisons),
    }
}

pub fn print_stats(stats: &QuotationStats, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", stats.total_quotations);
                return;
            }
            println!("Quotations:        {}", stats.total_quotations);
            println!("Suppliers:         {}", stats.unique_suppliers);
            println!("Materials:         {}", stats.unique_materials);
            println!("Countries:         {}", stats.unique_countries);
            println!("Last 30 days:      {}", stats.recent_quotations_30d);
            for (currency, count) in &stats.by_currency {
                println!("  {:<8} {}", currency, count);
            }
        }
        OutputFormat::Json => print_json(stats),
    }
}

pub fn print_rates(rates: &[ExchangeRate], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if rates.is_empty() {
                if !config.quiet {
                    println!("No exchange rates stored.");
                }
                return;
            }
            if config.quiet {
                for rate in rates {
                    println!("{}", rate.get_id());
                }
                return;
            }
            println!("{:<6}  {:<6}  {:>14}  UPDATED", "FROM", "TO", "RATE");
            for rate in rates {
                println!(
                    "{:<6}  {:<6}  {:>14}  {}",
                    rate.get_from_currency(),
                    rate.get_to_currency(),
                    rate.get_rate(),
                    rate.get_updated_at().format("%Y-%m-%d %H:%M")
                );
            }
        }
        OutputFormat::Json => print_json(rates),
    }
}

pub fn print_conversion(conversion: &ConversionDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", conversion.converted);
                return;
            }
            println!(
                "{} {} = {:.2} {} (rate {}{})",
                conversion.amount,
                conversion.from,
                conversion.converted,
                conversion.to,
                conversion.rate,
                if conversion.fallback_used { ", fallback" } else { "" }
            );
        }
        OutputFormat::Json => print_json(conversion),
    }
}

/// Prints a success message in the specified format
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "message": message })),
    }
}
