use client_desk::data::model::{FieldValue, PRIORITY_LEVEL};
use client_desk::state::{AppState, FilterDisplay};
use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

/// Matching client rows, one column per canonical header.
pub fn results_table(ui: &mut Ui, state: &AppState) {
    let FilterDisplay::Loaded(view) = &state.display else {
        return;
    };
    let dataset = &view.result.records;

    ui.add_space(6.0);
    if dataset.is_empty() {
        ui.label("No clients match the current filters.");
        return;
    }
    ui.strong(format!("{} matching client(s)", view.result.matched_count));

    egui::ScrollArea::horizontal()
        .id_salt("results_table")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(false)
                .columns(
                    Column::auto().at_least(80.0).clip(true),
                    dataset.columns.len(),
                )
                .header(22.0, |mut header| {
                    for col in &dataset.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(col.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, dataset.len(), |mut row| {
                        let record = &dataset.records[row.index()];
                        for col in &dataset.columns {
                            row.col(|ui: &mut Ui| match record.get(col) {
                                None | Some(FieldValue::Null) => {
                                    ui.weak("null");
                                }
                                Some(value) if col == PRIORITY_LEVEL => {
                                    let mut text = RichText::new(value.to_string()).strong();
                                    if let (Some(cm), Some(label)) =
                                        (&state.color_map, value.as_text())
                                    {
                                        text = text.color(cm.color_for(label));
                                    }
                                    ui.label(text);
                                }
                                Some(value) => {
                                    ui.label(value.to_string());
                                }
                            });
                        }
                    });
                });
        });
}
