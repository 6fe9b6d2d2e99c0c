use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::chart::Highlight;
use crate::data::pivot::PivotTable;

/// Pivot as a grid: one row per institute, one column per year.
pub fn pivot_table(ui: &mut Ui, pivot: &PivotTable, highlight: &Highlight) {
    let years = pivot.years();

    if ui.small_button("Copiar como JSON").clicked() {
        match serde_json::to_string_pretty(&pivot.to_percent_map()) {
            Ok(json) => ui.ctx().copy_text(json),
            Err(e) => log::error!("Failed to serialise pivot: {e}"),
        }
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(240.0))
        .columns(Column::auto().at_least(64.0), years.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Instituto");
            });
            for year in years {
                header.col(|ui| {
                    ui.strong(year.to_string());
                });
            }
        })
        .body(|mut body| {
            for (row, institute) in pivot.institutes().iter().enumerate() {
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        let name = RichText::new(institute);
                        ui.label(if highlight.matches(institute) { name.strong() } else { name });
                    });
                    for value in pivot.row_percents(row) {
                        table_row.col(|ui| {
                            ui.label(format!("{value:.1}%"));
                        });
                    }
                });
            }
        });
}
