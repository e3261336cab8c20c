mod app;
mod color;
mod data;
mod state;
mod ui;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use eframe::egui;

use app::QuitandaApp;
use data::aggregate::render;
use data::export::{export_to_path, EXPORT_FILE_NAME};
use data::filter::{FilterOptions, FilterState, FilteredView};
use data::loader::load_file;
use data::model::{Dataset, Week};
use state::AppState;

/// Financial dashboard for the Quitanda sales ledger
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Transaction table to load (.csv, .json or .parquet)
    #[arg(
        long,
        global = true,
        env = "QUITANDA_DATA",
        default_value = "dados_quitanda.csv"
    )]
    data: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the desktop dashboard (default)
    Gui,
    /// Print the dashboard for a selection as JSON
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Write the filtered rows to a CSV file
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file
        #[arg(long, short, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
}

/// Selections for the headless commands. A dimension left out keeps every
/// option selected.
#[derive(Debug, Args)]
struct FilterArgs {
    #[arg(long = "year")]
    years: Vec<i64>,
    #[arg(long = "month")]
    months: Vec<String>,
    #[arg(long = "week")]
    weeks: Vec<String>,
    #[arg(long = "product")]
    products: Vec<String>,
    #[arg(long = "payment")]
    payment_methods: Vec<String>,
}

impl FilterArgs {
    fn to_state(&self, dataset: &Dataset) -> FilterState {
        let mut state = FilterState::all(&FilterOptions::from_dataset(dataset));
        if !self.years.is_empty() {
            state.years = self.years.iter().copied().collect();
        }
        if !self.months.is_empty() {
            state.months = self.months.iter().cloned().collect();
        }
        if !self.weeks.is_empty() {
            state.weeks = self.weeks.iter().map(|w| Week::parse(w)).collect();
        }
        if !self.products.is_empty() {
            state.products = self.products.iter().cloned().collect();
        }
        if !self.payment_methods.is_empty() {
            state.payment_methods = self.payment_methods.iter().cloned().collect();
        }
        state
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(&cli.data),
        Command::Report { filters, pretty } => {
            let dataset = load(&cli.data)?;
            let dashboard = render(&dataset, &filters.to_state(&dataset));
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if pretty {
                serde_json::to_writer_pretty(&mut out, &dashboard)?;
            } else {
                serde_json::to_writer(&mut out, &dashboard)?;
            }
            writeln!(out)?;
            Ok(())
        }
        Command::Export { filters, output } => {
            let dataset = load(&cli.data)?;
            let view = FilteredView::new(&dataset, &filters.to_state(&dataset));
            let rows = export_to_path(&view, &output)?;
            println!("{rows} rows written to {}", output.display());
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<Dataset> {
    let dataset =
        load_file(path).with_context(|| format!("loading transactions from {}", path.display()))?;
    if dataset.is_empty() {
        log::warn!("{} contains no transactions", path.display());
    }
    Ok(dataset)
}

fn run_gui(data: &Path) -> Result<()> {
    // A bad start-up file still opens the window, with the error in the status line.
    let mut state = AppState::default();
    state.open(data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dashboard Financeiro da Quitanda",
        options,
        Box::new(|cc| {
            // Image loaders for the logo.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(QuitandaApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
