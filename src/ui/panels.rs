use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use cosmo_viewer::data::ObservationSet;
use cosmo_viewer::data::loader::{is_json, load_json, load_observations};
use cosmo_viewer::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} observations, z ≤ {:.2}",
            state.dataset.len(),
            state.dataset.max_redshift()
        ));

        ui.separator();

        if ui
            .selectable_label(state.show_table, "Observations")
            .clicked()
        {
            state.show_table = !state.show_table;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Fit summary (below the confidence plot)
// ---------------------------------------------------------------------------

/// Best fit per redshift cutoff and the currently selected parameters.
pub fn fit_summary(ui: &mut Ui, state: &AppState) {
    egui::Grid::new("fit_summary")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("cutoff");
            ui.strong("N");
            ui.strong("χ²min");
            ui.strong("best fit");
            ui.end_row();

            for surface in &state.surfaces {
                ui.label(format!("z < {:.1}", surface.z_max()));
                ui.label(surface.observations_used().to_string());
                ui.label(format!("{:.2}", surface.min()));
                match surface.best_fit() {
                    Some((om, ol)) => ui.label(format!("Ωm = {om:.2}, ΩΛ = {ol:.2}")),
                    None => ui.label("–"),
                };
                ui.end_row();
            }
        });

    ui.separator();
    let hint = if state.session.is_dragging() {
        "dragging"
    } else {
        "drag in the plot to change parameters"
    };
    ui.label(format!("{}  ({hint})", state.session.label()));
}

// ---------------------------------------------------------------------------
// Observation table
// ---------------------------------------------------------------------------

pub fn observation_table(ui: &mut Ui, dataset: &ObservationSet) {
    let observations = dataset.observations();
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("z");
            });
            header.col(|ui| {
                ui.strong("μ");
            });
            header.col(|ui| {
                ui.strong("σμ");
            });
        })
        .body(|body| {
            body.rows(18.0, observations.len(), |mut row| {
                let o = observations[row.index()];
                row.col(|ui| {
                    ui.label(format!("{:.3}", o.z));
                });
                row.col(|ui| {
                    ui.label(format!("{:.4}", o.mu));
                });
                row.col(|ui| {
                    ui.label(format!("{:.4}", o.sigma));
                });
            });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let Some(table) = rfd::FileDialog::new()
        .set_title("Open observations")
        .add_filter("Supported files", &["dat", "txt", "csv", "json"])
        .add_filter("Text table", &["dat", "txt"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return;
    };

    let result = if is_json(&table) {
        load_json(&table)
    } else {
        let Some(covariance) = rfd::FileDialog::new()
            .set_title("Open covariance matrix")
            .set_directory(table.parent().unwrap_or(std::path::Path::new(".")))
            .add_filter("Matrix", &["dat", "txt", "csv"])
            .pick_file()
        else {
            return;
        };
        load_observations(&table, &covariance)
    };

    match result {
        Ok(dataset) => state.set_dataset(dataset),
        Err(e) => {
            log::error!("Failed to load {}: {e:#}", table.display());
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
