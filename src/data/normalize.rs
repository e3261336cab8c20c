use log::{debug, warn};

use super::error::DataError;
use super::model::{Dataset, RawTable, RawTransaction, Transaction, Week};

// ---------------------------------------------------------------------------
// Currency / number cleanup
// ---------------------------------------------------------------------------

/// Parse a Brazilian-formatted amount such as `"R$ 1.234,56"`.
///
/// The `R$` marker and surrounding whitespace are removed, and a minus sign
/// written before the marker (`"-R$ 70,00"`) is kept. When a decimal comma is
/// present, dots are thousands separators and are dropped; without a comma
/// the text is parsed as-is, so already-numeric text (`"1234.56"`) is
/// returned unchanged. Anything that does not yield a finite number is
/// `None`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let text = text.trim();
    let (sign, text) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let cleaned = text.replace("R$", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let cleaned = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    format!("{sign}{cleaned}")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_year(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(year) = text.parse::<i64>() {
        return Some(year);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

// ---------------------------------------------------------------------------
// Table normalization
// ---------------------------------------------------------------------------

/// Clean a single row. `row` is only used for error messages.
pub fn normalize_row(row: usize, raw: &RawTransaction) -> Result<Transaction, DataError> {
    let year = parse_year(&raw.ano).ok_or_else(|| DataError::InvalidYear {
        row,
        value: raw.ano.clone(),
    })?;

    Ok(Transaction {
        year,
        month: non_empty(&raw.mes),
        week: Week::parse(&raw.semana),
        product: non_empty(&raw.produto),
        category: non_empty(&raw.categoria),
        quantity: parse_amount(&raw.quantidade),
        revenue: parse_amount(&raw.receita),
        expense: parse_amount(&raw.despesa),
        payment_method: raw.forma_pagamento.trim().to_string(),
    })
}

/// Turn the raw table into the immutable [`Dataset`].
///
/// Unparseable revenue or expense cells become missing values and are only
/// reported in the log; an invalid year fails the whole load.
pub fn normalize(raw: &RawTable) -> Result<Dataset, DataError> {
    let mut rows = Vec::with_capacity(raw.rows.len());
    let mut unparsed = 0usize;

    for (i, raw_row) in raw.rows.iter().enumerate() {
        let tx = normalize_row(i, raw_row)?;

        for (column, text, value) in [
            ("receita", &raw_row.receita, tx.revenue),
            ("despesa", &raw_row.despesa, tx.expense),
        ] {
            if value.is_none() && !text.trim().is_empty() {
                debug!("Row {i}: {column} '{text}' is not a number, treating as missing");
                unparsed += 1;
            }
        }
        rows.push(tx);
    }

    if unparsed > 0 {
        warn!("{unparsed} currency cells could not be parsed and were left missing");
    }

    let dataset = Dataset::from_transactions(rows);
    if !dataset.months().extra_names().is_empty() {
        warn!(
            "Non-canonical month names found: {:?}",
            dataset.months().extra_names()
        );
    }
    Ok(dataset)
}
