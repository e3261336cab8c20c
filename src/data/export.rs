use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use super::filter::FilteredView;
use super::model::{Transaction, COLUMNS};

/// File name offered for downloads of the filtered table.
pub const EXPORT_FILE_NAME: &str = "dados_filtrados.csv";

/// MIME type of the exported file.
pub const EXPORT_MIME: &str = "text/csv";

fn number_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write rows as CSV with the source column names and no index column.
/// Amounts are written as plain decimals, missing values as empty cells.
pub fn write_csv<'a, W: Write>(
    rows: impl IntoIterator<Item = &'a Transaction>,
    writer: W,
) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;

    let mut count = 0;
    for tx in rows {
        wtr.write_record([
            tx.year.to_string(),
            tx.month.clone().unwrap_or_default(),
            tx.week.to_string(),
            tx.product.clone().unwrap_or_default(),
            tx.category.clone().unwrap_or_default(),
            number_cell(tx.quantity),
            number_cell(tx.revenue),
            number_cell(tx.expense),
            tx.payment_method.clone(),
        ])?;
        count += 1;
    }
    wtr.flush()?;
    Ok(count)
}

/// The filtered table as UTF-8 CSV bytes.
pub fn to_csv_bytes(view: &FilteredView) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(view.iter(), &mut buf)?;
    Ok(buf)
}

/// Write the filtered table to `path`, returning the number of rows written.
pub fn export_to_path(view: &FilteredView, path: &Path) -> Result<usize> {
    let bytes = to_csv_bytes(view)?;
    std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    info!(
        "Exported {} rows ({EXPORT_MIME}) to {}",
        view.len(),
        path.display()
    );
    Ok(view.len())
}
