use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::color::ColorMap;
use crate::data::aggregate::{render_with_options, Dashboard};
use crate::data::export::export_to_path;
use crate::data::filter::{FilterOptions, FilterState, FilteredView};
use crate::data::loader::load_file;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Dataset>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Filter choices, computed once per dataset.
    pub options: FilterOptions,

    /// Current selections.
    pub filters: FilterState,

    /// Dashboard for the current selections (cached).
    pub dashboard: Option<Dashboard>,

    /// Colours per category, stable across filter changes.
    pub category_colors: ColorMap,

    /// Colours per payment method.
    pub payment_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset, select every option and render.
    pub fn set_dataset(&mut self, dataset: Dataset, source: PathBuf) {
        self.options = FilterOptions::from_dataset(&dataset);
        self.filters = FilterState::all(&self.options);

        let categories: BTreeSet<&str> = dataset
            .rows()
            .iter()
            .filter_map(|tx| tx.category.as_deref())
            .collect();
        self.category_colors = ColorMap::new(categories);
        self.payment_colors = ColorMap::new(self.options.payment_methods.iter().map(String::as_str));

        self.dataset = Some(dataset);
        self.source = Some(source);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the dashboard after a filter change. Options are reused
    /// from the load.
    pub fn refilter(&mut self) {
        self.dashboard = self
            .dataset
            .as_ref()
            .map(|ds| render_with_options(ds, &self.filters, self.options.clone()));
    }

    /// Load a file, keeping the current dataset if it fails.
    pub fn open(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => self.set_dataset(dataset, path.to_path_buf()),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Erro: {e:#}"));
            }
        }
    }

    /// Write the currently filtered rows to `path`.
    pub fn export_to(&mut self, path: &Path) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let view = FilteredView::new(ds, &self.filters);
        self.status_message = match export_to_path(&view, path) {
            Ok(n) => Some(format!("{n} linha(s) exportada(s) para {}", path.display())),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                Some(format!("Erro: {e:#}"))
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Transaction, Week};

    fn dataset() -> Dataset {
        let tx = |month: &str, product: &str, category: &str, payment: &str| Transaction {
            year: 2024,
            month: Some(month.to_string()),
            week: Week::Number(1),
            product: Some(product.to_string()),
            category: Some(category.to_string()),
            quantity: Some(1.0),
            revenue: Some(10.0),
            expense: Some(1.0),
            payment_method: payment.to_string(),
        };
        Dataset::from_transactions(vec![
            tx("Janeiro", "Maçã", "Fruta", "Pix"),
            tx("Fevereiro", "Alface", "Verdura", "Cartão"),
        ])
    }

    #[test]
    fn new_dataset_selects_everything() {
        let mut state = AppState::default();
        state.set_dataset(dataset(), PathBuf::from("dados.csv"));
        let dash = state.dashboard.as_ref().unwrap();
        assert_eq!(dash.filtered_rows, 2);
        assert_eq!(dash.metrics.total_revenue, 20.0);
        assert_eq!(state.filters.products.len(), 2);
    }

    #[test]
    fn refilter_updates_the_cached_dashboard() {
        let mut state = AppState::default();
        state.set_dataset(dataset(), PathBuf::from("dados.csv"));

        state.filters.payment_methods.remove("Pix");
        state.refilter();
        assert_eq!(state.dashboard.as_ref().unwrap().filtered_rows, 1);

        state.filters.months.clear();
        state.refilter();
        let dash = state.dashboard.as_ref().unwrap();
        assert_eq!(dash.filtered_rows, 0);
        assert_eq!(dash.metrics.net_profit, 0.0);
        assert_eq!(dash.options, state.options);
    }

    #[test]
    fn cached_options_render_the_same_dashboard() {
        let ds = dataset();
        let mut state = AppState::default();
        state.set_dataset(ds.clone(), PathBuf::from("dados.csv"));
        state.filters.products.remove("Maçã");
        state.refilter();

        let fresh = crate::data::aggregate::render(&ds, &state.filters);
        assert_eq!(state.dashboard.as_ref(), Some(&fresh));
    }

    #[test]
    fn failed_open_keeps_previous_dataset() {
        let mut state = AppState::default();
        state.set_dataset(dataset(), PathBuf::from("dados.csv"));
        state.open(Path::new("/no/such/file.csv"));
        assert!(state.dataset.is_some());
        assert!(state.status_message.as_deref().unwrap().starts_with("Erro"));
    }

    #[test]
    fn failed_first_open_leaves_no_dashboard() {
        let mut state = AppState::default();
        state.open(Path::new("/no/such/file.csv"));
        assert!(state.dataset.is_none());
        assert!(state.dashboard.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn export_writes_filtered_rows() {
        let mut state = AppState::default();
        state.set_dataset(dataset(), PathBuf::from("dados.csv"));
        state.filters.products.remove("Alface");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        state.export_to(&path);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(state.status_message.unwrap().starts_with("1 linha(s)"));
    }
}
