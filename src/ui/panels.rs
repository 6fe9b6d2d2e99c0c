use eframe::egui::{self, RichText, Ui};

use crate::data::drilldown::Outcome;
use crate::data::filter::Selection;
use crate::data::model::Facet;
use crate::state::AppState;

pub const APP_TITLE: &str = "Análisis de Participación por Facultad y Año";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    let mut change: Option<(Facet, Selection)> = None;

    for facet in [Facet::Region, Facet::Financing, Facet::Faculty] {
        let options = state.options.for_facet(facet);
        if let Some(sel) = selector(ui, facet, &state.wildcard_label, options, state.criteria.get(facet)) {
            change = Some((facet, sel));
        }
        ui.add_space(6.0);
    }

    // ---- Program drill-down, only once a faculty is chosen ----
    if state.program_choice_available() {
        ui.separator();
        if state.programs.is_empty() {
            ui.label(RichText::new("Sin carreras para esta facultad.").weak());
        } else if let Some(sel) = selector(
            ui,
            Facet::Program,
            &state.wildcard_label,
            &state.programs,
            &state.criteria.program,
        ) {
            change = Some((Facet::Program, sel));
        }
    }

    ui.separator();
    let reset = ui.button("Restablecer filtros").clicked();

    if let Some((facet, sel)) = change {
        state.select(facet, sel);
    } else if reset {
        state.reset();
    }
}

/// Combo box with the wildcard first, then `options`. Returns the new
/// selection when the user picked something.
fn selector(
    ui: &mut Ui,
    facet: Facet,
    wildcard: &str,
    options: &[String],
    current: &Selection,
) -> Option<Selection> {
    let mut picked = None;

    ui.strong(format!("{}:", facet.label()));
    egui::ComboBox::from_id_salt(facet.label())
        .selected_text(current.value().unwrap_or(wildcard))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_all(), wildcard).clicked() {
                picked = Some(Selection::All);
            }
            for option in options {
                let is_current = current.value() == Some(option.as_str());
                if ui.selectable_label(is_current, option).clicked() {
                    picked = Some(Selection::Value(option.clone()));
                }
            }
        });

    picked
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with row counts and the table toggle.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong(APP_TITLE);
        ui.separator();

        ui.label(format!(
            "{} filas de facultades, {} filas de carreras",
            state.datasets.faculties.len(),
            state.datasets.programs.len()
        ));

        ui.separator();

        match &state.outcome {
            Outcome::Chart { matched, pivot, .. } => {
                ui.label(format!(
                    "{matched} filas seleccionadas, {} instituciones",
                    pivot.institutes().len()
                ));
            }
            Outcome::NoData { .. } => {
                ui.label("0 filas seleccionadas");
            }
        }

        ui.separator();

        if ui.selectable_label(state.show_table, "Tabla").clicked() {
            state.show_table = !state.show_table;
        }
    });
}
