use chrono::NaiveDate;

use crate::pricing::MaterialComparison;

/// Header row of the comparison export
pub const COMPARISON_HEADER: [&str; 7] = [
    "Material",
    "Category",
    "Suppliers",
    "Min price",
    "Avg price",
    "Max price",
    "Currency",
];

/// Wraps a cell in double quotes, doubling any quote inside it
pub fn quote_cell(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Renders rows as CSV: every cell quoted, cells joined by commas, rows by `\n`
pub fn to_csv<R, C>(rows: R) -> String
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| quote_cell(cell.as_ref()))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The comparison list as a CSV document, header first
pub fn comparisons_to_csv(comparisons: &[MaterialComparison]) -> String {
    let header = COMPARISON_HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let rows = comparisons.iter().map(|c| {
        vec![
            c.material_name.clone(),
            c.material_category.clone().unwrap_or_default(),
            c.supplier_count.to_string(),
            c.lowest_price.to_string(),
            c.avg_price.to_string(),
            c.highest_price.to_string(),
            c.most_common_currency.clone(),
        ]
    });
    to_csv(std::iter::once(header).chain(rows))
}

/// Download name for a comparison export made on `date`
pub fn export_filename(date: NaiveDate) -> String {
    format!("material_quotations_{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaterialQuotation, QuotationDraft};
    use crate::pricing::build_comparisons;

    #[test]
    fn test_quote_cell_escapes_quotes() {
        assert_eq!(quote_cell("plain"), "\"plain\"");
        assert_eq!(quote_cell("12\" pipe"), "\"12\"\" pipe\"");
        assert_eq!(quote_cell(""), "\"\"");
    }

    #[test]
    fn test_to_csv_layout() {
        let csv = to_csv(vec![vec!["a", "b"], vec!["c,d", "e"]]);
        assert_eq!(csv, "\"a\",\"b\"\n\"c,d\",\"e\"");
    }

    #[test]
    fn test_comparisons_to_csv() {
        let quotes = vec![
            MaterialQuotation::new(QuotationDraft {
                material_name: "Tube 1/2\"".to_string(),
                supplier_email: "a@x.cn".to_string(),
                unit_price: 2.5,
                currency: "CNY".to_string(),
                ..Default::default()
            }),
            MaterialQuotation::new(QuotationDraft {
                material_name: "Tube 1/2\"".to_string(),
                supplier_email: "b@x.cn".to_string(),
                unit_price: 3.5,
                currency: "CNY".to_string(),
                ..Default::default()
            }),
        ];

        let csv = comparisons_to_csv(&build_comparisons(&quotes));
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "\"Material\",\"Category\",\"Suppliers\",\"Min price\",\"Avg price\",\"Max price\",\"Currency\""
        );
        assert_eq!(lines[1], "\"Tube 1/2\"\"\",\"\",\"2\",\"2.5\",\"3\",\"3.5\",\"CNY\"");
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(export_filename(date), "material_quotations_2026-03-09.csv");
    }
}
