use client_desk::config::Config;
use client_desk::state::{AppState, Services};
use eframe::egui;

use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ClientDeskApp {
    pub state: AppState,
    services: Services,
}

impl ClientDeskApp {
    pub fn new(config: &Config, services: Services) -> Self {
        Self {
            state: AppState::new(config),
            services,
        }
    }
}

impl eframe::App for ClientDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title, counts, status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: analysis + recommendation ----
        egui::SidePanel::left("analysis_panel")
            .default_width(340.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::analysis_panel(ui, &mut self.state, &self.services);
            });

        // ---- Central panel: load, filter, results ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::filter_panel(ui, &mut self.state, &self.services);
            ui.separator();
            egui::ScrollArea::vertical()
                .id_salt("results")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    plot::follow_up_timeline(ui, &self.state);
                    table::results_table(ui, &self.state);
                });
        });
    }
}
