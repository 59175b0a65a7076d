mod app;
mod ui;

use app::ClientDeskApp;
use client_desk::config::Config;
use client_desk::state::Services;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::load();
    let services = match Services::from_config(&config) {
        Ok(services) => services,
        Err(e) => {
            log::error!("Startup failed: {e:#}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Client Desk – Follow-up Planner",
        options,
        Box::new(move |_cc| Ok(Box::new(ClientDeskApp::new(&config, services)))),
    )
}
