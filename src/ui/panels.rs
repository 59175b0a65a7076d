use std::path::PathBuf;

use chrono::Local;
use client_desk::state::{AppState, FilterDisplay, Services, StatusLevel};
use eframe::egui::{self, Color32, RichText, Ui};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Title, record counts and the status line of the last action.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("Client Desk");
        ui.separator();

        if let Some((matched, total)) = state.counts() {
            ui.label(format!("{total} clients loaded, {matched} matching"));
            ui.separator();
        }

        if let Some(status) = &state.status {
            ui.label(RichText::new(&status.text).color(status_color(status.level)));
        }
    });
}

fn status_color(level: StatusLevel) -> Color32 {
    match level {
        StatusLevel::Info => Color32::LIGHT_BLUE,
        StatusLevel::Success => Color32::from_rgb(80, 170, 90),
        StatusLevel::Warning => Color32::from_rgb(230, 160, 40),
        StatusLevel::Error => Color32::RED,
    }
}

// ---------------------------------------------------------------------------
// Left side panel – analysis and recommendation
// ---------------------------------------------------------------------------

/// Analysis form, returned summary, and the recommendation picker.
pub fn analysis_panel(ui: &mut Ui, state: &mut AppState, services: &Services) {
    ui.heading("Analyze client message");
    ui.separator();

    egui::Grid::new("analysis_form")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Client ID");
            ui.text_edit_singleline(&mut state.analysis_form.client_id);
            ui.end_row();

            ui.label("S3 bucket");
            if ui
                .text_edit_singleline(&mut state.analysis_form.bucket)
                .changed()
            {
                state.sync_filter_bucket();
            }
            ui.end_row();

            ui.label("Input key");
            ui.text_edit_singleline(&mut state.analysis_form.key);
            ui.end_row();
        });

    ui.label("Current message");
    ui.add(
        egui::TextEdit::multiline(&mut state.analysis_form.current_message)
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );

    if ui.button("Analyze").clicked() {
        state.run_analysis(&services.analysis);
    }

    // Clone what we need so we can mutate state below.
    let (rows, recommendations) = match &state.analysis {
        Some(a) => (a.summary.display_rows(), a.summary.recommendations.clone()),
        None => return,
    };

    ui.add_space(8.0);
    ui.heading("Summary");
    egui::Grid::new("analysis_summary")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (label, value) in &rows {
                ui.strong(label.as_str());
                ui.label(value.as_str());
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    ui.heading("Recommendations");
    if recommendations.is_empty() {
        ui.label("The analysis returned no recommendations.");
        return;
    }

    for (i, text) in recommendations.iter().enumerate() {
        let selected = state.selected_recommendation == Some(i);
        if ui.radio(selected, text.as_str()).clicked() {
            state.select_recommendation(i);
        }
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Output key");
        ui.text_edit_singleline(&mut state.output_key);
    });

    let can_save = state.selected_recommendation.is_some();
    if ui
        .add_enabled(can_save, egui::Button::new("Save recommendation"))
        .clicked()
    {
        state.save_recommendation(&services.recommendations);
    }
}

// ---------------------------------------------------------------------------
// Central panel – load and filter
// ---------------------------------------------------------------------------

/// Location inputs, the load action, and the priority/date selectors.
pub fn filter_panel(ui: &mut Ui, state: &mut AppState, services: &Services) {
    ui.heading("Filter clients by priority and follow-up date");
    ui.separator();

    egui::Grid::new("filter_location")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("S3 bucket");
            if ui
                .text_edit_singleline(&mut state.filter_location.bucket)
                .changed()
            {
                state.filter_bucket_changed();
            }
            ui.end_row();

            ui.label("Output CSV key");
            ui.text_edit_singleline(&mut state.filter_location.key);
            ui.end_row();
        });

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Load and Filter").clicked() {
            state.load_and_filter(&services.store, Local::now().date_naive());
        }

        let can_export = matches!(state.display, FilterDisplay::Loaded(_));
        if ui
            .add_enabled(can_export, egui::Button::new("Export…"))
            .clicked()
        {
            if let Some(path) = export_dialog() {
                state.export_matches(&path);
            }
        }
    });

    match &state.display {
        FilterDisplay::NotLoaded => {
            ui.label("Enter a bucket and key, then load the processed client data.");
            return;
        }
        FilterDisplay::NoData => {
            ui.label("No data found in the file.");
            return;
        }
        FilterDisplay::Loaded(_) => {}
    }

    ui.add_space(6.0);
    priority_selector(ui, state);
    date_selector(ui, state);

    if state.criteria_dirty {
        ui.label(
            RichText::new("Selections changed. Press Load and Filter to apply them.").italics(),
        );
    }
}

fn priority_selector(ui: &mut Ui, state: &mut AppState) {
    let options = state.priority_options();

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Priority level(s)");
        if ui.small_button("All").clicked() {
            state.select_all_priorities();
        }
        if ui.small_button("None").clicked() {
            state.select_no_priorities();
        }
    });

    if options.is_empty() {
        ui.label("No priority values found in the data.");
        return;
    }

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for label in &options {
            let mut checked = state.is_priority_selected(label);
            let mut text = RichText::new(label.as_str());
            if let Some(cm) = &state.color_map {
                text = text.color(cm.color_for(label));
            }
            if ui.checkbox(&mut checked, text).changed() {
                state.toggle_priority(label);
            }
        }
    });
}

fn date_selector(ui: &mut Ui, state: &mut AppState) {
    let Some(mut date) = state.criteria.as_ref().map(|c| c.max_follow_up_date) else {
        return;
    };
    let bounds = match &state.display {
        FilterDisplay::Loaded(view) => view.bounds,
        _ => None,
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Follow-up on or before");
        ui.add(egui_extras::DatePickerButton::new(&mut date).id_salt("max_follow_up_date"));
        match bounds {
            Some((lo, hi)) => ui.label(format!("(data spans {lo} to {hi})")),
            None => ui.label("(no readable follow-up dates, defaulting to today)"),
        };
    });

    state.set_max_follow_up_date(date);
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

fn export_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export matching clients")
        .set_file_name("filtered_clients.csv")
        .add_filter("CSV", &["csv"])
        .save_file()
}
