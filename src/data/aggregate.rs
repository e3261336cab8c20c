use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::Serialize;

use super::filter::{FilterOptions, FilterState, FilteredView};
use super::model::{Dataset, Week};

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

/// Headline numbers for the filtered subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_revenue: f64,
    pub total_expense: f64,
    pub net_profit: f64,
    /// Mean revenue over rows that have a revenue value.
    pub average_revenue: f64,
    /// Empty when no sales row is in the subset.
    pub best_selling_product: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRevenue {
    pub product: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthProfit {
    pub month: String,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentShare {
    pub payment_method: String,
    pub revenue: f64,
    /// Fraction of the filtered revenue, in `0.0..=1.0` for non-negative data.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRevenue {
    pub week: Week,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeRevenue {
    pub month: String,
    pub revenue: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLine {
    pub product: String,
    pub quantity: Option<f64>,
    pub revenue: Option<f64>,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProducts {
    pub category: String,
    pub lines: Vec<ProductLine>,
}

/// Everything a presentation layer needs for one filter selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub metrics: SummaryMetrics,
    pub revenue_by_product: Vec<ProductRevenue>,
    pub profit_by_month: Vec<MonthProfit>,
    pub payment_distribution: Vec<PaymentShare>,
    pub revenue_by_week: Vec<WeekRevenue>,
    pub revenue_by_category: Vec<CategoryRevenue>,
    pub cumulative_revenue_by_month: Vec<CumulativeRevenue>,
    pub category_products: Vec<CategoryProducts>,
    pub options: FilterOptions,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Filter the dataset and compute every view. Pure: the same inputs always
/// give the same dashboard.
pub fn render(dataset: &Dataset, filters: &FilterState) -> Dashboard {
    render_with_options(dataset, filters, FilterOptions::from_dataset(dataset))
}

/// [`render`] with filter options the caller already holds for `dataset`.
pub fn render_with_options(
    dataset: &Dataset,
    filters: &FilterState,
    options: FilterOptions,
) -> Dashboard {
    let view = FilteredView::new(dataset, filters);
    debug!("Rendering {} of {} rows", view.len(), dataset.len());

    Dashboard {
        total_rows: dataset.len(),
        filtered_rows: view.len(),
        metrics: summary_metrics(&view),
        revenue_by_product: revenue_by_product(&view),
        profit_by_month: profit_by_month(&view),
        payment_distribution: payment_distribution(&view),
        revenue_by_week: revenue_by_week(&view),
        revenue_by_category: revenue_by_category(&view),
        cumulative_revenue_by_month: cumulative_revenue_by_month(&view),
        category_products: category_products(&view),
        options,
    }
}

fn sum_present(values: impl Iterator<Item = Option<f64>>) -> f64 {
    values.flatten().sum()
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

pub fn summary_metrics(view: &FilteredView) -> SummaryMetrics {
    if view.is_empty() {
        return SummaryMetrics::default();
    }

    let total_revenue = sum_present(view.iter().map(|tx| tx.revenue));
    let total_expense = sum_present(view.iter().map(|tx| tx.expense));
    let present = view.iter().filter(|tx| tx.revenue.is_some()).count();
    let average_revenue = if present == 0 {
        0.0
    } else {
        total_revenue / present as f64
    };

    SummaryMetrics {
        total_revenue,
        total_expense,
        net_profit: total_revenue - total_expense,
        average_revenue,
        best_selling_product: best_selling_product(view),
    }
}

/// Product with the largest total quantity among sales rows. Ties go to the
/// larger revenue, then to the alphabetically first name.
pub fn best_selling_product(view: &FilteredView) -> String {
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for tx in view.iter().filter(|tx| !tx.is_expense()) {
        let Some(product) = tx.product.as_deref() else {
            continue;
        };
        let entry = totals.entry(product).or_default();
        entry.0 += tx.quantity.unwrap_or(0.0);
        entry.1 += tx.revenue.unwrap_or(0.0);
    }

    // BTreeMap iterates names ascending, so only a strictly better total
    // replaces the current best.
    let mut best: Option<(&str, f64, f64)> = None;
    for (name, (quantity, revenue)) in totals {
        let better = match best {
            None => true,
            Some((_, bq, br)) => quantity > bq || (quantity == bq && revenue > br),
        };
        if better {
            best = Some((name, quantity, revenue));
        }
    }
    best.map(|(name, _, _)| name.to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Grouped views
// ---------------------------------------------------------------------------

pub fn revenue_by_product(view: &FilteredView) -> Vec<ProductRevenue> {
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in view.iter() {
        if let Some(product) = tx.product.as_deref() {
            *groups.entry(product).or_default() += tx.revenue.unwrap_or(0.0);
        }
    }
    groups
        .into_iter()
        .map(|(product, revenue)| ProductRevenue {
            product: product.to_string(),
            revenue,
        })
        .collect()
}

/// Revenue and expense per month rank, in month order.
fn month_totals(view: &FilteredView) -> Vec<(String, f64, f64)> {
    let months = view.months();
    let mut groups: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
    for tx in view.iter() {
        let Some(rank) = tx.month.as_deref().and_then(|m| months.rank(m)) else {
            continue;
        };
        let entry = groups.entry(rank).or_default();
        entry.0 += tx.revenue.unwrap_or(0.0);
        entry.1 += tx.expense.unwrap_or(0.0);
    }
    groups
        .into_iter()
        .filter_map(|(rank, (revenue, expense))| {
            months
                .name(rank)
                .map(|name| (name.to_string(), revenue, expense))
        })
        .collect()
}

pub fn profit_by_month(view: &FilteredView) -> Vec<MonthProfit> {
    month_totals(view)
        .into_iter()
        .map(|(month, revenue, expense)| MonthProfit {
            month,
            profit: revenue - expense,
        })
        .collect()
}

pub fn cumulative_revenue_by_month(view: &FilteredView) -> Vec<CumulativeRevenue> {
    let mut running = 0.0;
    month_totals(view)
        .into_iter()
        .map(|(month, revenue, _)| {
            running += revenue;
            CumulativeRevenue {
                month,
                revenue,
                cumulative: running,
            }
        })
        .collect()
}

pub fn payment_distribution(view: &FilteredView) -> Vec<PaymentShare> {
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in view.iter() {
        *groups.entry(tx.payment_method.as_str()).or_default() += tx.revenue.unwrap_or(0.0);
    }
    let total: f64 = groups.values().sum();
    groups
        .into_iter()
        .map(|(method, revenue)| PaymentShare {
            payment_method: method.to_string(),
            revenue,
            share: if total == 0.0 { 0.0 } else { revenue / total },
        })
        .collect()
}

pub fn revenue_by_week(view: &FilteredView) -> Vec<WeekRevenue> {
    let mut groups: BTreeMap<&Week, f64> = BTreeMap::new();
    for tx in view.iter() {
        *groups.entry(&tx.week).or_default() += tx.revenue.unwrap_or(0.0);
    }
    groups
        .into_iter()
        .map(|(week, revenue)| WeekRevenue {
            week: week.clone(),
            revenue,
        })
        .collect()
}

pub fn revenue_by_category(view: &FilteredView) -> Vec<CategoryRevenue> {
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in view.iter() {
        if let Some(category) = tx.category.as_deref() {
            *groups.entry(category).or_default() += tx.revenue.unwrap_or(0.0);
        }
    }
    groups
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category: category.to_string(),
            revenue,
        })
        .collect()
}

/// Product rows per sales category, categories in first-seen order.
/// Expense rows and rows without a product are left out.
pub fn category_products(view: &FilteredView) -> Vec<CategoryProducts> {
    let mut tables: Vec<CategoryProducts> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for tx in view.iter().filter(|tx| !tx.is_expense()) {
        let Some(category) = tx.category.as_deref() else {
            continue;
        };
        let idx = *position.entry(category).or_insert_with(|| {
            tables.push(CategoryProducts {
                category: category.to_string(),
                lines: Vec::new(),
            });
            tables.len() - 1
        });
        if let Some(product) = &tx.product {
            tables[idx].lines.push(ProductLine {
                product: product.clone(),
                quantity: tx.quantity,
                revenue: tx.revenue,
                payment_method: tx.payment_method.clone(),
            });
        }
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Transaction;

    #[allow(clippy::too_many_arguments)]
    fn tx(
        month: &str,
        week: i64,
        product: &str,
        category: &str,
        quantity: f64,
        revenue: Option<f64>,
        expense: Option<f64>,
        payment: &str,
    ) -> Transaction {
        Transaction {
            year: 2024,
            month: Some(month.to_string()),
            week: Week::Number(week),
            product: Some(product.to_string()),
            category: Some(category.to_string()),
            quantity: Some(quantity),
            revenue,
            expense,
            payment_method: payment.to_string(),
        }
    }

    fn scenario() -> Dataset {
        Dataset::from_transactions(vec![
            tx("Janeiro", 1, "Maçã", "Fruta", 10.0, Some(50.0), Some(0.0), "Pix"),
            tx("Fevereiro", 2, "Maçã", "Fruta", 5.0, Some(25.0), Some(5.0), "Cartão"),
        ])
    }

    fn all(ds: &Dataset) -> FilterState {
        FilterState::all(&FilterOptions::from_dataset(ds))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn end_to_end_scenario() {
        let ds = scenario();
        let dash = render(&ds, &all(&ds));

        assert!(close(dash.metrics.total_revenue, 75.0));
        assert!(close(dash.metrics.total_expense, 5.0));
        assert!(close(dash.metrics.net_profit, 70.0));
        assert!(close(dash.metrics.average_revenue, 37.5));
        assert_eq!(dash.metrics.best_selling_product, "Maçã");

        let profit: Vec<(&str, f64)> = dash
            .profit_by_month
            .iter()
            .map(|m| (m.month.as_str(), m.profit))
            .collect();
        assert_eq!(profit, vec![("Janeiro", 50.0), ("Fevereiro", 20.0)]);

        let cumulative: Vec<(&str, f64)> = dash
            .cumulative_revenue_by_month
            .iter()
            .map(|m| (m.month.as_str(), m.cumulative))
            .collect();
        assert_eq!(cumulative, vec![("Janeiro", 50.0), ("Fevereiro", 75.0)]);
    }

    #[test]
    fn empty_subset_gives_zeroes_and_empty_tables() {
        let ds = scenario();
        let mut filters = all(&ds);
        filters.products.clear();
        let dash = render(&ds, &filters);

        assert_eq!(dash.filtered_rows, 0);
        assert_eq!(dash.total_rows, 2);
        assert_eq!(dash.metrics, SummaryMetrics::default());
        assert!(dash.revenue_by_product.is_empty());
        assert!(dash.profit_by_month.is_empty());
        assert!(dash.payment_distribution.is_empty());
        assert!(dash.revenue_by_week.is_empty());
        assert!(dash.revenue_by_category.is_empty());
        assert!(dash.cumulative_revenue_by_month.is_empty());
        assert!(dash.category_products.is_empty());
        // options still describe the whole table
        assert_eq!(dash.options.products, vec!["Maçã"]);
    }

    #[test]
    fn missing_values_are_skipped_not_zeroed() {
        let ds = Dataset::from_transactions(vec![
            tx("Março", 1, "Couve", "Verdura", 1.0, Some(10.0), None, "Pix"),
            tx("Março", 1, "Couve", "Verdura", 1.0, None, Some(2.0), "Pix"),
            tx("Março", 1, "Couve", "Verdura", 1.0, Some(20.0), None, "Pix"),
        ]);
        let metrics = summary_metrics(&FilteredView::new(&ds, &all(&ds)));
        assert!(close(metrics.total_revenue, 30.0));
        assert!(close(metrics.total_expense, 2.0));
        // mean over the two present values, not three rows
        assert!(close(metrics.average_revenue, 15.0));
    }

    #[test]
    fn product_sums_add_up_to_total_revenue() {
        let ds = Dataset::from_transactions(vec![
            tx("Janeiro", 1, "Maçã", "Fruta", 3.0, Some(12.5), None, "Pix"),
            tx("Janeiro", 2, "Banana", "Fruta", 2.0, Some(7.25), None, "Pix"),
            tx("Abril", 14, "Alface", "Verdura", 1.0, None, None, "Dinheiro"),
            tx("Maio", 18, "Banana", "Fruta", 4.0, Some(3.0), None, "Cartão"),
        ]);
        let view = FilteredView::new(&ds, &all(&ds));
        let by_product: f64 = revenue_by_product(&view).iter().map(|p| p.revenue).sum();
        assert!(close(by_product, summary_metrics(&view).total_revenue));
        assert_eq!(revenue_by_product(&view).len(), 3);
    }

    #[test]
    fn cumulative_is_month_ordered_and_non_decreasing() {
        // rows deliberately out of calendar order
        let ds = Dataset::from_transactions(vec![
            tx("Dezembro", 50, "Maçã", "Fruta", 1.0, Some(5.0), None, "Pix"),
            tx("Março", 10, "Maçã", "Fruta", 1.0, Some(1.0), None, "Pix"),
            tx("Janeiro", 1, "Maçã", "Fruta", 1.0, Some(2.0), None, "Pix"),
            tx("Março", 11, "Maçã", "Fruta", 1.0, Some(0.0), None, "Pix"),
        ]);
        let view = FilteredView::new(&ds, &all(&ds));
        let series = cumulative_revenue_by_month(&view);

        let months: Vec<&str> = series.iter().map(|c| c.month.as_str()).collect();
        assert_eq!(months, vec!["Janeiro", "Março", "Dezembro"]);
        assert!(series.windows(2).all(|w| w[0].cumulative <= w[1].cumulative));
        let last = series.last().unwrap().cumulative;
        assert!(close(last, summary_metrics(&view).total_revenue));
    }

    #[test]
    fn unknown_months_are_aggregated_after_december() {
        let ds = Dataset::from_transactions(vec![
            tx("Trezembro", 1, "Maçã", "Fruta", 1.0, Some(4.0), None, "Pix"),
            tx("Dezembro", 1, "Maçã", "Fruta", 1.0, Some(1.0), None, "Pix"),
        ]);
        let view = FilteredView::new(&ds, &all(&ds));
        let months: Vec<String> = profit_by_month(&view).into_iter().map(|m| m.month).collect();
        assert_eq!(months, vec!["Dezembro", "Trezembro"]);
    }

    #[test]
    fn weeks_are_sorted_ascending() {
        let ds = Dataset::from_transactions(vec![
            tx("Janeiro", 10, "Maçã", "Fruta", 1.0, Some(1.0), None, "Pix"),
            tx("Janeiro", 2, "Maçã", "Fruta", 1.0, Some(2.0), None, "Pix"),
            tx("Janeiro", 10, "Maçã", "Fruta", 1.0, Some(3.0), None, "Pix"),
        ]);
        let weeks = revenue_by_week(&FilteredView::new(&ds, &all(&ds)));
        assert_eq!(
            weeks,
            vec![
                WeekRevenue { week: Week::Number(2), revenue: 2.0 },
                WeekRevenue { week: Week::Number(10), revenue: 4.0 },
            ]
        );
    }

    #[test]
    fn payment_shares_sum_to_one() {
        let ds = Dataset::from_transactions(vec![
            tx("Janeiro", 1, "Maçã", "Fruta", 1.0, Some(30.0), None, "Pix"),
            tx("Janeiro", 1, "Maçã", "Fruta", 1.0, Some(10.0), None, "Cartão"),
            tx("Janeiro", 1, "Maçã", "Fruta", 1.0, Some(60.0), None, "Pix"),
        ]);
        let shares = payment_distribution(&FilteredView::new(&ds, &all(&ds)));
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].payment_method, "Cartão");
        assert!(close(shares[0].share, 0.1));
        assert!(close(shares[1].share, 0.9));
    }

    #[test]
    fn zero_revenue_gives_zero_shares() {
        let ds = Dataset::from_transactions(vec![tx(
            "Janeiro", 1, "Aluguel", "Despesa", 0.0, Some(0.0), Some(900.0), "Pix",
        )]);
        let shares = payment_distribution(&FilteredView::new(&ds, &all(&ds)));
        assert_eq!(shares[0].share, 0.0);
    }

    #[test]
    fn category_listing_skips_expenses_and_missing_products() {
        let mut no_product = tx("Janeiro", 1, "x", "Verdura", 1.0, Some(1.0), None, "Pix");
        no_product.product = None;
        let rows = vec![
            tx("Janeiro", 1, "Alface", "Verdura", 2.0, Some(4.0), None, "Pix"),
            tx("Janeiro", 1, "Aluguel", "Despesa", 0.0, None, Some(900.0), "Pix"),
            tx("Janeiro", 1, "Maçã", "Fruta", 3.0, Some(6.0), None, "Cartão"),
            no_product,
        ];
        let ds = Dataset::from_transactions(rows);
        let view = FilteredView::new(&ds, &all(&ds));
        let tables = category_products(&view);

        let names: Vec<&str> = tables.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, vec!["Verdura", "Fruta"]);
        assert_eq!(tables[0].lines.len(), 1);
        assert_eq!(tables[0].lines[0].product, "Alface");
        assert_eq!(tables[1].lines[0].payment_method, "Cartão");
    }

    #[test]
    fn best_seller_is_by_quantity_and_ignores_expenses() {
        let ds = Dataset::from_transactions(vec![
            tx("Janeiro", 1, "Banana", "Fruta", 4.0, Some(8.0), None, "Pix"),
            tx("Janeiro", 1, "Alface", "Verdura", 3.0, Some(30.0), None, "Pix"),
            tx("Janeiro", 1, "Alface", "Verdura", 3.0, Some(30.0), None, "Pix"),
            tx("Janeiro", 1, "Aluguel", "Despesa", 100.0, None, Some(1.0), "Pix"),
        ]);
        let view = FilteredView::new(&ds, &all(&ds));
        assert_eq!(best_selling_product(&view), "Alface");
    }

    #[test]
    fn best_seller_ties_go_to_revenue_then_name() {
        let ds = Dataset::from_transactions(vec![
            tx("Janeiro", 1, "Couve", "Verdura", 2.0, Some(5.0), None, "Pix"),
            tx("Janeiro", 1, "Batata", "Legume", 2.0, Some(9.0), None, "Pix"),
            tx("Janeiro", 1, "Alho", "Legume", 2.0, Some(9.0), None, "Pix"),
        ]);
        let view = FilteredView::new(&ds, &all(&ds));
        assert_eq!(best_selling_product(&view), "Alho");
    }
}
