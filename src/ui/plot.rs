use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use crate::color::PRIMARY;
use crate::data::aggregate::Dashboard;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render every chart for the current dashboard.
pub fn charts(ui: &mut Ui, state: &AppState, dash: &Dashboard) {
    ui.columns(2, |cols: &mut [Ui]| {
        let bars = dash
            .revenue_by_product
            .iter()
            .map(|p| (p.product.clone(), p.revenue, PRIMARY))
            .collect();
        bar_chart(&mut cols[0], "Receita por Produto", "Receita (R$)", bars);

        let points = dash
            .profit_by_month
            .iter()
            .map(|m| (m.month.clone(), m.profit))
            .collect();
        line_chart(&mut cols[1], "Lucro Mensal", "Lucro (R$)", points);
    });

    ui.columns(2, |cols: &mut [Ui]| {
        let bars = dash
            .payment_distribution
            .iter()
            .map(|p| {
                (
                    format!("{} ({:.1}%)", p.payment_method, p.share * 100.0),
                    p.share * 100.0,
                    state.payment_colors.color_for(&p.payment_method),
                )
            })
            .collect();
        bar_chart(&mut cols[0], "Proporção das Formas de Pagamento", "%", bars);

        let bars = dash
            .revenue_by_week
            .iter()
            .map(|w| (w.week.to_string(), w.revenue, PRIMARY))
            .collect();
        bar_chart(&mut cols[1], "Receita Semanal", "Receita (R$)", bars);
    });

    let bars = dash
        .revenue_by_category
        .iter()
        .map(|c| {
            (
                c.category.clone(),
                c.revenue,
                state.category_colors.color_for(&c.category),
            )
        })
        .collect();
    bar_chart(ui, "Receita por Categoria", "Receita (R$)", bars);

    let points = dash
        .cumulative_revenue_by_month
        .iter()
        .map(|c| (c.month.clone(), c.cumulative))
        .collect();
    line_chart(ui, "📈 Receita Acumulada ao Longo do Ano", "Receita Acumulada (R$)", points);
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Category axis: integer positions map to labels, everything else is blank.
fn label_formatter(
    labels: Vec<String>,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let pos = mark.value.round();
        if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
            return String::new();
        }
        labels.get(pos as usize).cloned().unwrap_or_default()
    }
}

fn empty_notice(ui: &mut Ui, title: &str) {
    ui.label(RichText::new(title).strong());
    ui.label(
        RichText::new(format!("Nenhum dado para exibir em \"{title}\"."))
            .color(Color32::from_rgb(0xe6, 0xa2, 0x3c)),
    );
}

fn bar_chart(ui: &mut Ui, title: &str, y_label: &str, bars: Vec<(String, f64, Color32)>) {
    if bars.is_empty() {
        empty_notice(ui, title);
        return;
    }

    ui.label(RichText::new(title).strong());
    let labels: Vec<String> = bars.iter().map(|(l, _, _)| l.clone()).collect();
    let bars: Vec<Bar> = bars
        .into_iter()
        .enumerate()
        .map(|(i, (label, value, color))| {
            Bar::new(i as f64, value).name(label).fill(color).width(0.7)
        })
        .collect();

    Plot::new(title)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(label_formatter(labels))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn line_chart(ui: &mut Ui, title: &str, y_label: &str, points: Vec<(String, f64)>) {
    if points.is_empty() {
        empty_notice(ui, title);
        return;
    }

    ui.label(RichText::new(title).strong());
    let labels: Vec<String> = points.iter().map(|(l, _)| l.clone()).collect();
    let coords: Vec<[f64; 2]> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| [i as f64, *v])
        .collect();

    Plot::new(title)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .x_axis_formatter(label_formatter(labels))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let line: PlotPoints = coords.iter().copied().collect();
            let markers: PlotPoints = coords.iter().copied().collect();
            plot_ui.line(Line::new(line).name(title).color(PRIMARY).width(2.0));
            plot_ui.points(Points::new(markers).radius(4.0).color(PRIMARY));
        });
}
