use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::color;
use crate::data::filter::{FilterPhase, FilterSpec, FilterValue};
use crate::session::{DashboardSession, Tab};

/// Format a statistic, showing undefined values as "N/A".
pub fn fmt_stat(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "N/A".to_string()
    } else {
        format!("{value:.decimals$}")
    }
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, session: &mut DashboardSession) {
    ui.heading("Filters");
    let customised = session.phase() == FilterPhase::Custom;
    if ui
        .add_enabled(customised, egui::Button::new("🔄 Reset Filters"))
        .clicked()
    {
        session.reset_filters();
    }
    ui.separator();
    if session.filters().is_empty() {
        ui.label("No filterable columns in this dataset.");
    }

    // Clone the specs so we can mutate the session inside the loop.
    let specs: Vec<FilterSpec> = session.filters().specs().to_vec();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for spec in &specs {
                match (spec.default_value(), spec.current_value()) {
                    (FilterValue::Categories(_), FilterValue::Categories(_)) => {
                        categorical_filter(ui, session, spec);
                    }
                    (
                        FilterValue::Range { min: lower, max: upper },
                        FilterValue::Range { min, max },
                    ) => {
                        range_filter(ui, session, spec, (*lower, *upper), (*min, *max));
                    }
                    _ => {}
                }
            }

            ui.separator();
            dataset_overview(ui, session);
        });
}

fn categorical_filter(ui: &mut Ui, session: &mut DashboardSession, spec: &FilterSpec) {
    let (FilterValue::Categories(all_values), FilterValue::Categories(selected)) =
        (spec.default_value(), spec.current_value())
    else {
        return;
    };
    let col = spec.column();

    // Show count of selected / total in the header
    let header_text = format!("{}  ({}/{})", spec.label(), selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(col)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    session.select_all(col);
                }
                if ui.small_button("None").clicked() {
                    session.select_none(col);
                }
            });

            for val in all_values {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    session.toggle_filter_value(col, val);
                }
            }
        });
}

fn range_filter(
    ui: &mut Ui,
    session: &mut DashboardSession,
    spec: &FilterSpec,
    (lower, upper): (f64, f64),
    (mut min, mut max): (f64, f64),
) {
    let integral = lower.fract() == 0.0 && upper.fract() == 0.0;
    ui.strong(spec.label());

    let mut from = Slider::new(&mut min, lower..=upper).text("from");
    let mut to = Slider::new(&mut max, lower..=upper).text("to");
    if integral {
        from = from.integer();
        to = to.integer();
    }
    let changed = ui.add(from).changed() | ui.add(to).changed();

    if changed {
        // Dragging one handle past the other pushes it along.
        if min > max {
            max = min;
        }
        session.select_range(spec.column(), min, max);
    }
    ui.add_space(6.0);
}

fn dataset_overview(ui: &mut Ui, session: &DashboardSession) {
    let view = session.view();
    if view.is_empty() {
        ui.label(
            RichText::new("⚠ No data available with the selected filters.")
                .color(Color32::RED),
        );
        return;
    }

    ui.strong("📊 Dataset Overview");
    ui.label(format!(
        "Total Students: {} of {}",
        view.n_rows(),
        session.table().n_rows()
    ));
    ui.label(format!("Columns: {}", view.n_cols()));
    ui.label("Active Filters:");
    for spec in session.filters().specs() {
        ui.label(format!("  • {} = {}", spec.column(), spec.describe_selection()));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar with the headline metrics.
pub fn top_bar(ui: &mut Ui, session: &mut DashboardSession) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Copy summary as JSON").clicked() {
                match session.summary_json() {
                    Ok(json) => {
                        ui.ctx().copy_text(json);
                        session.status_message = Some("Summary copied to clipboard".into());
                    }
                    Err(e) => {
                        log::error!("Failed to serialize summary: {e}");
                        session.status_message = Some(format!("Error: {e}"));
                    }
                }
                ui.close_menu();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();
        ui.label(RichText::new("Student Performance EDA Dashboard").color(color::TITLE_GREEN));
        ui.separator();

        let summary = session.summary();
        ui.label(format!("👥 Total Students: {}", summary.overview.rows));
        ui.separator();
        match summary.grades {
            Some(grades) => {
                ui.label(format!("📊 Average Final Grade (G3): {}", fmt_stat(grades.mean, 2)));
                ui.separator();
                let rate = if grades.pass_rate.is_nan() {
                    "N/A".to_string()
                } else {
                    format!("{:.1}%", grades.pass_rate)
                };
                ui.label(format!("✅ Pass Rate: {rate}"));
            }
            None => {
                ui.label("📊 Average Final Grade (G3): N/A");
                ui.separator();
                ui.label("✅ Pass Rate: N/A");
            }
        }

        if let Some(msg) = &session.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Tab strip
// ---------------------------------------------------------------------------

pub fn tab_bar(ui: &mut Ui, session: &mut DashboardSession) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut session.active_tab, tab, tab.label());
        }
    });
    ui.separator();
}

#[cfg(test)]
mod tests {
    use super::fmt_stat;

    #[test]
    fn undefined_statistics_render_as_na() {
        assert_eq!(fmt_stat(f64::NAN, 2), "N/A");
        assert_eq!(fmt_stat(10.0, 2), "10.00");
    }
}
