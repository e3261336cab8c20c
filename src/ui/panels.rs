use std::collections::BTreeSet;
use std::fmt::Display;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::{CategoryProducts, SummaryMetrics};
use crate::data::export::EXPORT_FILE_NAME;
use crate::state::AppState;
use crate::ui::format_brl;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let logo = egui::include_image!("../../assets/logo_quitanda.png");
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add(
            egui::Image::new(logo)
                .max_width(ui.available_width() * 0.6)
                .max_height(96.0),
        );
    });
    ui.add_space(4.0);

    ui.heading("🔍 Filtros");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("Nenhum arquivo carregado.");
        return;
    }

    // Options never change while a dataset is loaded; clone so the
    // selections can be borrowed mutably.
    let options = state.options.clone();
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= checklist(ui, "Ano", &options.years, &mut state.filters.years);
            changed |= checklist(ui, "Mês", &options.months, &mut state.filters.months);
            changed |= checklist(ui, "Semana", &options.weeks, &mut state.filters.weeks);
            changed |= checklist(ui, "Produto", &options.products, &mut state.filters.products);
            changed |= checklist(
                ui,
                "Forma de Pagamento",
                &options.payment_methods,
                &mut state.filters.payment_methods,
            );
        });

    if changed {
        state.refilter();
    }
}

/// A collapsible list of checkboxes over one dimension. Returns whether the
/// selection changed.
fn checklist<T: Ord + Clone + Display>(
    ui: &mut Ui,
    title: &str,
    options: &[T],
    selected: &mut BTreeSet<T>,
) -> bool {
    let mut changed = false;
    let header_text = format!("{title}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("Todos").clicked() {
                    selected.extend(options.iter().cloned());
                    changed = true;
                }
                if ui.small_button("Nenhum").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            for val in options {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                    changed = true;
                }
            }
        });

    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state
                .dashboard
                .as_ref()
                .is_some_and(|d| d.filtered_rows > 0);
            if ui
                .add_enabled(can_export, egui::Button::new("Exportar filtrados…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(source) = &state.source {
            ui.label(source.display().to_string());
            ui.separator();
        }

        if let Some(dash) = &state.dashboard {
            ui.label(format!(
                "{} transações, {} selecionadas",
                dash.total_rows, dash.filtered_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Erro") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Metrics row
// ---------------------------------------------------------------------------

pub fn metrics_row(ui: &mut Ui, metrics: &SummaryMetrics) {
    ui.columns(5, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Receita Total", &format_brl(metrics.total_revenue));
        metric(&mut cols[1], "Despesa Total", &format_brl(metrics.total_expense));
        metric(&mut cols[2], "Lucro Líquido", &format_brl(metrics.net_profit));
        metric(&mut cols[3], "Ticket Médio", &format_brl(metrics.average_revenue));
        let best = if metrics.best_selling_product.is_empty() {
            "-"
        } else {
            metrics.best_selling_product.as_str()
        };
        metric(&mut cols[4], "Produto mais vendido", best);
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).heading().strong());
    });
}

// ---------------------------------------------------------------------------
// Product tables per category
// ---------------------------------------------------------------------------

/// Two tables per row, one per sales category.
pub fn category_tables(ui: &mut Ui, tables: &[CategoryProducts]) {
    for pair in tables.chunks(2) {
        ui.columns(2, |cols: &mut [Ui]| {
            for (col, table) in cols.iter_mut().zip(pair) {
                col.push_id(&table.category, |ui: &mut Ui| {
                    ui.label(RichText::new(&table.category).heading());
                    category_table(ui, table);
                });
            }
        });
        ui.add_space(8.0);
    }
}

fn category_table(ui: &mut Ui, table: &CategoryProducts) {
    let optional = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();

    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::remainder().at_least(80.0))
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .max_scroll_height(250.0)
        .header(20.0, |mut header| {
            for title in ["Produto", "Quantidade", "Receita", "Pagamento"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for line in &table.lines {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(&line.product);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(optional(line.quantity));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(line.revenue.map(format_brl).unwrap_or_default());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(&line.payment_method);
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Download button for the filtered table.
pub fn export_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📥 Exportar Dados");
    let has_rows = state
        .dashboard
        .as_ref()
        .is_some_and(|d| d.filtered_rows > 0);
    if has_rows {
        if ui.button("Baixar dados filtrados em CSV").clicked() {
            save_file_dialog(state);
        }
    } else {
        ui.label("Nenhum dado disponível para exportação.");
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir transações")
        .add_filter("Arquivos suportados", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Exportar dados filtrados")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn bundled_logo_decodes() {
        let bytes = include_bytes!("../../assets/logo_quitanda.png");
        let logo = image::load_from_memory_with_format(bytes, image::ImageFormat::Png).unwrap();
        assert_eq!((logo.width(), logo.height()), (128, 128));
    }
}
