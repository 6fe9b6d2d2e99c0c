use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoint, Text};

use crate::chart::{GroupTick, BAR_WIDTH};
use crate::state::AppState;

pub const NO_DATA_MESSAGE: &str = "No hay datos para mostrar con los filtros seleccionados.";

// ---------------------------------------------------------------------------
// Grouped bar chart (central panel)
// ---------------------------------------------------------------------------

/// Render the participation chart, or the "no data" message.
pub fn participation_chart(ui: &mut Ui, state: &AppState) {
    let Some(layout) = &state.layout else {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(state.outcome.subject().title());
        });
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(NO_DATA_MESSAGE);
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(layout.title);
        if let Some(subtitle) = &layout.subtitle {
            ui.label(subtitle);
        }
    });

    let tick_positions: Vec<f64> = layout.ticks.iter().map(|t| t.x).collect();

    Plot::new("participation_chart")
        .legend(Legend::default())
        .x_axis_label(layout.x_label)
        .y_axis_label(layout.y_label)
        .x_grid_spacer(move |_input| {
            tick_positions
                .iter()
                .map(|&value| GridMark { value, step_size: 1.0 })
                .collect()
        })
        // Institute names are drawn inside the plot, under the bars.
        .x_axis_formatter(|_mark, _range| String::new())
        .y_axis_formatter(|mark, _range| {
            if mark.value < 0.0 {
                String::new()
            } else {
                format!("{:.0}%", mark.value)
            }
        })
        .include_y(layout.y_min)
        .include_y(layout.y_max * 1.1 + 1.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &layout.series {
                let bars: Vec<Bar> = series
                    .bars
                    .iter()
                    .zip(&layout.ticks)
                    .map(|(b, tick)| {
                        let bar = Bar::new(b.x, b.value)
                            .width(BAR_WIDTH)
                            .fill(series.color)
                            .name(format!("{}\n{}", tick.institute, series.name));
                        if b.highlighted {
                            bar.stroke(Stroke::new(1.5, Color32::BLACK))
                        } else {
                            bar
                        }
                    })
                    .collect();

                plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(series.color));

                for b in &series.bars {
                    if let Some(label) = &b.label {
                        let text = RichText::new(label).size(11.0);
                        plot_ui.text(
                            Text::new(PlotPoint::new(b.x, b.value), text).anchor(Align2::CENTER_BOTTOM),
                        );
                    }
                }
            }

            for tick in &layout.ticks {
                plot_ui.text(
                    Text::new(PlotPoint::new(tick.x, 0.0), tick_text(tick)).anchor(Align2::CENTER_TOP),
                );
            }
        });
}

/// Institute label under its bar group; the highlighted institute is bold.
fn tick_text(tick: &GroupTick) -> RichText {
    let text = RichText::new(&tick.institute).size(11.0);
    if tick.highlighted {
        text.strong()
    } else {
        text
    }
}
