use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::ArrayRef;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{Dataset, RawTable, RawTransaction, COLUMNS};
use super::normalize::normalize;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and normalize a transaction table.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let raw = load_raw(path)?;
    let dataset = normalize(&raw).with_context(|| format!("normalizing {}", path.display()))?;
    info!(
        "Loaded {} transactions from {}",
        dataset.len(),
        path.display()
    );
    Ok(dataset)
}

/// Read a transaction table without cleaning it. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the nine transaction columns
/// * `.json`    – `[{ "ano": 2024, "mes": "Janeiro", ... }, ...]`
/// * `.parquet` – flat columns with the same names
pub fn load_raw(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV file {}", path.display()))?;
            read_csv(file)
        }
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read CSV text with a header row. Extra columns are ignored; cells are
/// trimmed.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("reading CSV headers")?;
    for column in COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DataError::MissingColumn(column.to_string()).into());
        }
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.deserialize::<RawTransaction>().enumerate() {
        rows.push(result.with_context(|| format!("CSV row {row_no}"))?);
    }
    Ok(RawTable { rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// Numbers are turned back into text so they go through the same cleaning
/// as CSV cells; `null` becomes an empty cell.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or(DataError::NotAnObject(i))?;
        let cell = |column: &str| -> Result<String> {
            let value = obj
                .get(column)
                .ok_or_else(|| DataError::MissingColumn(column.to_string()))
                .with_context(|| format!("JSON row {i}"))?;
            Ok(json_to_text(value))
        };
        rows.push(RawTransaction {
            ano: cell("ano")?,
            mes: cell("mes")?,
            semana: cell("semana")?,
            produto: cell("produto")?,
            categoria: cell("categoria")?,
            quantidade: cell("quantidade")?,
            receita: cell("receita")?,
            despesa: cell("despesa")?,
            forma_pagamento: cell("forma_pagamento")?,
        });
    }
    Ok(RawTable { rows })
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
/// Each column may be stored as text, as a number or dictionary-encoded
/// (Pandas categoricals); every cell is rendered back to text.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    // Nulls become empty cells.
    let options = FormatOptions::default().with_null("");
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let mut formatters = Vec::with_capacity(COLUMNS.len());
        for name in COLUMNS {
            let idx = schema
                .index_of(name)
                .map_err(|_| DataError::MissingColumn(name.to_string()))?;
            formatters.push(text_formatter(name, batch.column(idx), &options)?);
        }

        for row in 0..batch.num_rows() {
            let cell = |i: usize| formatters[i].value(row).to_string();
            rows.push(RawTransaction {
                ano: cell(0),
                mes: cell(1),
                semana: cell(2),
                produto: cell(3),
                categoria: cell(4),
                quantidade: cell(5),
                receita: cell(6),
                despesa: cell(7),
                forma_pagamento: cell(8),
            });
        }
    }

    Ok(RawTable { rows })
}

fn text_formatter<'a>(
    column: &str,
    col: &'a ArrayRef,
    options: &'a FormatOptions<'a>,
) -> Result<ArrayFormatter<'a>> {
    ArrayFormatter::try_new(col.as_ref(), options).map_err(|e| {
        debug!("No text rendering for column '{column}': {e}");
        DataError::UnsupportedColumnType {
            column: column.to_string(),
            data_type: col.data_type().to_string(),
        }
        .into()
    })
}
