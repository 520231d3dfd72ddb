/// Downloadable renderings of comparison data
pub mod csv;

pub use csv::{comparisons_to_csv, export_filename};
