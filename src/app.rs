use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct QuitandaApp {
    pub state: AppState,
}

impl QuitandaApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for QuitandaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &mut self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let Some(dash) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Abra um arquivo de transações  (Arquivo → Abrir…)");
        });
        return;
    };

    ui.heading("Dashboard Bom Gosto");
    ui.label("Acompanhe receitas, despesas e lucros semanais e mensais. Use os filtros à esquerda.");
    ui.add_space(8.0);

    ui.strong("Métricas Gerais");
    panels::metrics_row(ui, &dash.metrics);
    ui.separator();

    ui.strong("Gráficos Financeiros");
    plot::charts(ui, state, dash);
    ui.separator();

    ui.heading("📦 Produtos por Categoria");
    panels::category_tables(ui, &dash.category_products);
    ui.separator();

    panels::export_section(ui, state);
}
