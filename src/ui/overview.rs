use eframe::egui::{self, Color32, RichText, Slider, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::color;
use crate::data::model::Table;
use crate::data::schema;
use crate::data::stats::{self, DescribeRow, Overview};
use crate::session::{DashboardSession, PREVIEW_ROWS_RANGE};
use crate::ui::panels::fmt_stat;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Overview tab
// ---------------------------------------------------------------------------

pub fn overview_tab(ui: &mut Ui, session: &mut DashboardSession) {
    ui.heading("📖 Dataset Overview");
    ui.label(
        "Secondary-school students in Portugal: demographic, social and academic \
         factors and their mathematics grades. The goal is to see which features \
         drive the final exam score (G3).",
    );
    ui.add_space(8.0);

    metric_cards(ui, &session.summary().overview);
    ui.add_space(8.0);

    ui.heading("🔍 Data Preview");
    ui.add(Slider::new(&mut session.preview_rows, PREVIEW_ROWS_RANGE).text("Rows to display"));
    let preview = session.view().head(session.preview_rows);
    ui.push_id("preview_table", |ui: &mut Ui| data_table(ui, &preview));
    ui.add_space(8.0);

    ui.columns(2, |cols| {
        cols[0].heading("📑 Data Info");
        cols[0].push_id("info_table", |ui: &mut Ui| column_info(ui, session.view()));

        cols[1].heading("📊 Key Distributions");
        let view = session.view();
        if let Some(counts) = stats::value_counts(view, schema::SEX) {
            cols[1].strong("✨ Gender Distribution");
            plot::count_bars(&mut cols[1], "gender_counts", &counts, |label, _| {
                color::GENDER_COLORS
                    .iter()
                    .find(|(v, _)| *v == label)
                    .map_or(Color32::GRAY, |(_, c)| *c)
            });
        }
        if let Some(mut counts) = stats::value_counts(view, schema::FAILURES) {
            counts.sort_by(|a, b| a.0.cmp(&b.0));
            let theme = [color::NEON_YELLOW, color::MINT, color::FOREST, color::ORANGE];
            cols[1].strong("📉 Number of Past Class Failures");
            plot::count_bars(&mut cols[1], "failure_counts", &counts, |_, i| {
                theme[i % theme.len()]
            });
        }
    });

    ui.add_space(8.0);
    ui.heading("📈 Summary Statistics");
    ui.push_id("describe_table", |ui: &mut Ui| describe_table(ui, &session.summary().describe));
}

fn metric_cards(ui: &mut Ui, overview: &Overview) {
    let cards = [
        ("Rows", overview.rows),
        ("Columns", overview.columns),
        ("Missing", overview.missing),
        ("Duplicates", overview.duplicates),
    ];
    ui.columns(cards.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(cards) {
            egui::Frame::group(col.style())
                .fill(color::FOREST)
                .show(col, |ui: &mut Ui| {
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.label(RichText::new(label).color(color::NEON_YELLOW).strong());
                        ui.label(RichText::new(value.to_string()).color(color::NEON_YELLOW).heading());
                    });
                });
        }
    });
}

/// Render a table's rows with one column per table column.
fn data_table(ui: &mut Ui, table: &Table) {
    let columns = table.columns();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(false)
        .columns(TableColumn::auto().at_least(40.0), columns.len())
        .header(20.0, |mut header| {
            for col in columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(col.name());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.n_rows(), |mut row| {
                let index = row.index();
                for col in columns {
                    row.col(|ui: &mut Ui| {
                        ui.label(col.values()[index].to_string());
                    });
                }
            });
        });
}

/// Per-column name, kind, and non-null count.
fn column_info(ui: &mut Ui, table: &Table) {
    ui.label(format!(
        "{} entries, {} columns",
        table.n_rows(),
        table.n_cols()
    ));
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(TableColumn::auto(), 3)
        .header(18.0, |mut header| {
            for title in ["Column", "Non-Null Count", "Kind"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(16.0, table.n_cols(), |mut row| {
                let col = &table.columns()[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.monospace(col.name());
                });
                row.col(|ui: &mut Ui| {
                    ui.monospace(format!("{} non-null", col.len() - col.missing_count()));
                });
                row.col(|ui: &mut Ui| {
                    ui.monospace(col.kind().to_string());
                });
            });
        });
}

fn describe_table(ui: &mut Ui, rows: &[DescribeRow]) {
    const HEADERS: [&str; 9] = ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(TableColumn::auto().at_least(56.0), HEADERS.len())
        .header(20.0, |mut header| {
            for title in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let r = &rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.strong(&r.column);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(r.count.to_string());
                });
                for value in [r.mean, r.std, r.min, r.q25, r.median, r.q75, r.max] {
                    row.col(|ui: &mut Ui| {
                        ui.label(fmt_stat(value, 2));
                    });
                }
            });
        });
    ui.small(
        "Mean, standard deviation, extremes and quartiles of every numeric feature \
         in the filtered data.",
    );
}
