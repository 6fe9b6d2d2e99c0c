use eframe::egui;

use crate::data::drilldown::Outcome;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and counts ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: pivot as a table ----
        if self.state.show_table {
            if let Outcome::Chart { pivot, .. } = &self.state.outcome {
                egui::TopBottomPanel::bottom("pivot_table")
                    .resizable(true)
                    .default_height(220.0)
                    .show(ctx, |ui| {
                        egui::ScrollArea::both().show(ui, |ui| {
                            table::pivot_table(ui, pivot, &self.state.highlight);
                        });
                    });
            }
        }

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::participation_chart(ui, &self.state);
        });
    }
}
