use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{is_absent_payment, Dataset, MonthOrder, Transaction, Week};

// ---------------------------------------------------------------------------
// Filter options: the choices offered for each dimension
// ---------------------------------------------------------------------------

/// Distinct values offered per filter dimension. Always computed from the
/// unfiltered dataset, so choosing one filter never narrows another.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<i64>,
    /// Canonical months first, then any other month names in first-seen order.
    pub months: Vec<String>,
    pub weeks: Vec<Week>,
    pub products: Vec<String>,
    /// Excludes the empty / `nan` sentinels.
    pub payment_methods: Vec<String>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut years = BTreeSet::new();
        let mut weeks = BTreeSet::new();
        let mut products = BTreeSet::new();
        let mut payment_methods = BTreeSet::new();

        for tx in dataset.rows() {
            years.insert(tx.year);
            weeks.insert(tx.week.clone());
            if let Some(p) = &tx.product {
                products.insert(p.clone());
            }
            if !is_absent_payment(&tx.payment_method) {
                payment_methods.insert(tx.payment_method.clone());
            }
        }

        FilterOptions {
            years: years.into_iter().collect(),
            months: dataset.months().names().to_vec(),
            weeks: weeks.into_iter().collect(),
            products: products.into_iter().collect(),
            payment_methods: payment_methods.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter state: which values are selected per dimension
// ---------------------------------------------------------------------------

/// The five selection sets. A row passes when each of its values is in the
/// matching set; an empty set therefore matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub years: BTreeSet<i64>,
    pub months: BTreeSet<String>,
    pub weeks: BTreeSet<Week>,
    pub products: BTreeSet<String>,
    pub payment_methods: BTreeSet<String>,
}

impl FilterState {
    /// Initialise with every offered option selected.
    pub fn all(options: &FilterOptions) -> Self {
        FilterState {
            years: options.years.iter().copied().collect(),
            months: options.months.iter().cloned().collect(),
            weeks: options.weeks.iter().cloned().collect(),
            products: options.products.iter().cloned().collect(),
            payment_methods: options.payment_methods.iter().cloned().collect(),
        }
    }

    /// Whether a single row passes all five predicates.
    ///
    /// A row without a month or product never matches those dimensions.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.years.contains(&tx.year)
            && tx.month.as_ref().is_some_and(|m| self.months.contains(m))
            && self.weeks.contains(&tx.week)
            && tx.product.as_ref().is_some_and(|p| self.products.contains(p))
            && self.payment_methods.contains(&tx.payment_method)
    }
}

/// Return indices of rows that pass the filters.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, tx)| filters.matches(tx))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – borrowed subset of the dataset
// ---------------------------------------------------------------------------

/// The filtered subset: the source dataset plus the indices that passed.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, filters: &FilterState) -> Self {
        FilteredView {
            dataset,
            indices: filtered_indices(dataset, filters),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        let rows = self.dataset.rows();
        self.indices.iter().map(move |&i| &rows[i])
    }

    pub fn months(&self) -> &'a MonthOrder {
        self.dataset.months()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
