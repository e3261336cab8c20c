use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column layout of the source table
// ---------------------------------------------------------------------------

/// Required columns, in the order they are written back on export.
pub const COLUMNS: [&str; 9] = [
    "ano",
    "mes",
    "semana",
    "produto",
    "categoria",
    "quantidade",
    "receita",
    "despesa",
    "forma_pagamento",
];

/// The twelve month names in calendar order.
pub const CANONICAL_MONTHS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Category marking a row as a business expense rather than a product sale.
pub const EXPENSE_CATEGORY: &str = "Despesa";

/// Empty and `nan` payment methods count as "no payment method recorded".
pub fn is_absent_payment(method: &str) -> bool {
    let method = method.trim();
    method.is_empty() || method.eq_ignore_ascii_case("nan")
}

// ---------------------------------------------------------------------------
// RawTransaction – one row exactly as read from the file
// ---------------------------------------------------------------------------

/// A row before normalization. Every cell is kept as text so that the
/// same cleaning rules apply whatever the source format was.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTransaction {
    pub ano: String,
    pub mes: String,
    pub semana: String,
    pub produto: String,
    pub categoria: String,
    pub quantidade: String,
    pub receita: String,
    pub despesa: String,
    pub forma_pagamento: String,
}

/// The file contents before cleaning.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<RawTransaction>,
}

// ---------------------------------------------------------------------------
// Week – integer or free-form identifier
// ---------------------------------------------------------------------------

/// Week identifier. Numeric weeks sort before labelled ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Week {
    Number(i64),
    Label(String),
}

impl Week {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Ok(n) = text.parse::<i64>() {
            return Week::Number(n);
        }
        // Pandas writes integer columns holding NaN as floats ("3.0").
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 => Week::Number(f as i64),
            _ => Week::Label(text.to_string()),
        }
    }
}

impl PartialOrd for Week {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Week {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Week::Number(a), Week::Number(b)) => a.cmp(b),
            (Week::Label(a), Week::Label(b)) => a.cmp(b),
            (Week::Number(_), Week::Label(_)) => Ordering::Less,
            (Week::Label(_), Week::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Week::Number(n) => write!(f, "{n}"),
            Week::Label(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction – one normalized row
// ---------------------------------------------------------------------------

/// A cleaned row. `None` in a numeric field means the source text could not
/// be parsed; it is skipped by sums and means, never treated as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub year: i64,
    pub month: Option<String>,
    pub week: Week,
    pub product: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub revenue: Option<f64>,
    pub expense: Option<f64>,
    pub payment_method: String,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.category.as_deref() == Some(EXPENSE_CATEGORY)
    }
}

// ---------------------------------------------------------------------------
// MonthOrder – month name → rank lookup
// ---------------------------------------------------------------------------

/// Total order over month names. The canonical months take ranks 0..=11;
/// any other name is appended in the order it was first observed.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthOrder {
    names: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl Default for MonthOrder {
    fn default() -> Self {
        let names: Vec<String> = CANONICAL_MONTHS.iter().map(|m| m.to_string()).collect();
        let ranks = names
            .iter()
            .enumerate()
            .map(|(rank, name)| (name.clone(), rank))
            .collect();
        Self { names, ranks }
    }
}

impl MonthOrder {
    /// Register a month name, returning its rank.
    pub fn observe(&mut self, name: &str) -> usize {
        if let Some(&rank) = self.ranks.get(name) {
            return rank;
        }
        let rank = self.names.len();
        self.names.push(name.to_string());
        self.ranks.insert(name.to_string(), rank);
        rank
    }

    pub fn rank(&self, name: &str) -> Option<usize> {
        self.ranks.get(name).copied()
    }

    pub fn name(&self, rank: usize) -> Option<&str> {
        self.names.get(rank).map(String::as_str)
    }

    /// All known names in rank order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names seen in the data that are not canonical months.
    pub fn extra_names(&self) -> &[String] {
        &self.names[CANONICAL_MONTHS.len()..]
    }
}

// ---------------------------------------------------------------------------
// Dataset – the normalized, immutable table
// ---------------------------------------------------------------------------

/// The normalized table plus its month ordering. Never mutated after
/// construction; filtering produces index views over it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<Transaction>,
    months: MonthOrder,
}

impl Dataset {
    /// Build a dataset, registering every month name that appears in `rows`.
    pub fn from_transactions(rows: Vec<Transaction>) -> Self {
        let mut months = MonthOrder::default();
        for tx in &rows {
            if let Some(m) = &tx.month {
                months.observe(m);
            }
        }
        Dataset { rows, months }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn months(&self) -> &MonthOrder {
        &self.months
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_months_are_ranked_in_calendar_order() {
        let order = MonthOrder::default();
        assert_eq!(order.rank("Janeiro"), Some(0));
        assert_eq!(order.rank("Março"), Some(2));
        assert_eq!(order.rank("Dezembro"), Some(11));
        assert_eq!(order.rank("Smarch"), None);
    }

    #[test]
    fn unknown_months_rank_after_canonical_in_first_seen_order() {
        let mut order = MonthOrder::default();
        assert_eq!(order.observe("Smarch"), 12);
        assert_eq!(order.observe("Abril"), 3);
        assert_eq!(order.observe("Octember"), 13);
        assert_eq!(order.observe("Smarch"), 12);
        assert_eq!(order.extra_names(), &["Smarch", "Octember"]);
    }

    #[test]
    fn weeks_parse_and_order_numbers_before_labels() {
        assert_eq!(Week::parse(" 3 "), Week::Number(3));
        assert_eq!(Week::parse("4.0"), Week::Number(4));
        assert_eq!(Week::parse("S1"), Week::Label("S1".into()));

        let mut weeks = vec![Week::parse("S1"), Week::parse("10"), Week::parse("2")];
        weeks.sort();
        assert_eq!(
            weeks,
            vec![Week::Number(2), Week::Number(10), Week::Label("S1".into())]
        );
    }

    #[test]
    fn absent_payment_methods() {
        assert!(is_absent_payment(""));
        assert!(is_absent_payment("  "));
        assert!(is_absent_payment("nan"));
        assert!(is_absent_payment("NaN"));
        assert!(!is_absent_payment("Pix"));
    }
}
