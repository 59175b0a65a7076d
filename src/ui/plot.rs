use std::collections::BTreeMap;

use chrono::NaiveDate;
use client_desk::state::{AppState, FilterDisplay};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

// ---------------------------------------------------------------------------
// Follow-up timeline
// ---------------------------------------------------------------------------

/// Matching clients per follow-up day, one bar series per priority.
pub fn follow_up_timeline(ui: &mut Ui, state: &AppState) {
    let FilterDisplay::Loaded(view) = &state.display else {
        return;
    };
    let Some((origin, _)) = view.bounds else {
        return;
    };

    // priority → day → count
    let mut counts: BTreeMap<&str, BTreeMap<NaiveDate, usize>> = BTreeMap::new();
    for record in &view.result.records.records {
        let (Some(priority), Some(date)) = (record.priority_level(), record.follow_up_date())
        else {
            continue;
        };
        *counts.entry(priority).or_default().entry(date).or_default() += 1;
    }
    if counts.is_empty() {
        return;
    }

    // Series sit side by side within each day.
    let series = counts.len() as f64;
    let width = 0.8 / series;

    let charts: Vec<BarChart> = counts
        .iter()
        .enumerate()
        .map(|(i, (priority, per_day))| {
            let color = state
                .color_map
                .as_ref()
                .map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(priority));
            let offset = -0.4 + width * (i as f64 + 0.5);

            let bars: Vec<Bar> = per_day
                .iter()
                .map(|(date, n)| {
                    let day = date.signed_duration_since(origin).num_days() as f64;
                    Bar::new(day + offset, *n as f64)
                        .width(width)
                        .name(format!("{date}: {n} × {priority}"))
                })
                .collect();

            BarChart::new(bars).name(*priority).color(color)
        })
        .collect();

    ui.add_space(6.0);
    ui.strong("Follow-ups per day");
    Plot::new("follow_up_timeline")
        .legend(Legend::default())
        .height(200.0)
        .x_axis_label(format!("Days since {origin}"))
        .y_axis_label("Clients")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
