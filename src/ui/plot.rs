use eframe::egui::{self, Align2, Color32, FontId, Rect, RichText, Sense, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoint, PlotPoints, Points,
};

use crate::color::{self, ColorMap};
use crate::data::model::{CellValue, Table};
use crate::data::schema;
use crate::data::stats::{self, CorrelationMatrix};
use crate::session::DashboardSession;
use crate::ui::panels::fmt_stat;

// ---------------------------------------------------------------------------
// Shared chart helpers
// ---------------------------------------------------------------------------

/// Vertical bar chart of value counts; one named bar per category.
pub fn count_bars<F>(ui: &mut Ui, id: &str, counts: &[(CellValue, usize)], color_for: F)
where
    F: Fn(&str, usize) -> Color32,
{
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (value, n))| {
            let label = value.to_string();
            Bar::new(i as f64, *n as f64)
                .name(format!("{label}: {n}"))
                .fill(color_for(&label, i))
                .stroke(Stroke::new(1.2, Color32::WHITE))
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .legend(Legend::default())
        .height(220.0)
        .show_axes([false, true])
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Horizontal bars of (feature, correlation) pairs, first entry on top.
fn correlation_bars(ui: &mut Ui, id: &str, pairs: &[(String, f64)], low: Color32, high: Color32) {
    let n = pairs.len();
    let bars: Vec<Bar> = pairs
        .iter()
        .enumerate()
        .map(|(i, (name, r))| {
            Bar::new((n - i) as f64, *r)
                .name(format!("{name}: {}", fmt_stat(*r, 2)))
                .fill(if r.abs() > 0.5 { high } else { low })
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .legend(Legend::default())
        .height(220.0)
        .show_axes([true, false])
        .x_axis_label("Correlation with G3")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

/// Columns listed in a scatter point's hover text, when present.
const HOVER_COLUMNS: [&str; 4] = [schema::AGE, schema::FAMSIZE, schema::FAILURES, schema::ABSENCES];

/// One-line description of a row for scatter tooltips, e.g.
/// `age 17, famsize GT3, failures 0, absences 4`.
fn point_details(view: &Table, row: usize) -> String {
    HOVER_COLUMNS
        .iter()
        .filter_map(|name| view.column(name).map(|c| format!("{name} {}", c.values()[row])))
        .collect::<Vec<_>>()
        .join(", ")
}

/// How many students sharing one point the tooltip lists.
const HOVER_ROWS: usize = 3;

/// Points of two numeric columns, coloured by a categorical column.
/// `sizes` (if given) scales each point's radius. Hovering a point lists the
/// students at that position.
fn grouped_scatter(
    ui: &mut Ui,
    id: &str,
    view: &Table,
    (x_col, y_col): (&str, &str),
    group_col: &str,
    size_col: Option<&str>,
) {
    let (Some(x), Some(y)) = (view.numeric_column(x_col), view.numeric_column(y_col)) else {
        ui.label(format!("Columns '{x_col}' and '{y_col}' are required for this chart."));
        return;
    };
    let xs = x.numeric_values();
    let ys = y.numeric_values();
    let groups = view.column(group_col);
    let sizes = size_col
        .and_then(|c| view.numeric_column(c))
        .map(|c| c.numeric_values());
    let max_size = sizes
        .as_ref()
        .map(|s| s.iter().flatten().copied().fold(0.0_f64, f64::max))
        .unwrap_or(0.0);

    let color_map = groups.map(|g| ColorMap::with_fixed(&g.unique_values(), color::GENDER_COLORS));

    let hover: Vec<([f64; 2], String)> = (0..view.n_rows())
        .filter_map(|row| Some(([xs[row]?, ys[row]?], point_details(view, row))))
        .collect();

    Plot::new(id)
        .legend(Legend::default())
        .height(360.0)
        .x_axis_label(x_col)
        .y_axis_label(y_col)
        .label_formatter(move |name: &str, value: &PlotPoint| {
            let position = format!("{x_col}: {:.1}\n{y_col}: {:.1}", value.x, value.y);
            if name.is_empty() {
                return position;
            }
            let students: Vec<&str> = hover
                .iter()
                .filter(|([x, y], _)| *x == value.x && *y == value.y)
                .map(|(_, details)| details.as_str())
                .collect();
            let mut text = format!("{name}\n{position}");
            for details in students.iter().take(HOVER_ROWS) {
                text.push_str(&format!("\n{details}"));
            }
            if students.len() > HOVER_ROWS {
                text.push_str(&format!("\n… and {} more", students.len() - HOVER_ROWS));
            }
            text
        })
        .show(ui, |plot_ui| {
            for row in 0..view.n_rows() {
                let (Some(xv), Some(yv)) = (xs[row], ys[row]) else {
                    continue;
                };
                let group = groups.map(|g| &g.values()[row]);
                let fill = match (&color_map, group) {
                    (Some(cm), Some(v)) => cm.color_for(v),
                    _ => color::NEON_YELLOW,
                };
                let radius = match &sizes {
                    Some(s) if max_size > 0.0 => {
                        3.0 + 12.0 * (s[row].unwrap_or(0.0) / max_size).sqrt() as f32
                    }
                    _ => 4.0,
                };
                let name = group.map_or_else(|| y_col.to_string(), |v| v.to_string());
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[xv, yv]]))
                        .radius(radius)
                        .color(fill.gamma_multiply(0.75))
                        .filled(true)
                        .name(name),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

pub fn correlation_tab(ui: &mut Ui, session: &DashboardSession) {
    ui.heading("🔗 Correlation Heatmap");
    let matrix = &session.summary().correlations;
    if matrix.is_empty() {
        ui.label("No numeric columns to correlate.");
        return;
    }
    egui::ScrollArea::both().max_height(560.0).show(ui, |ui: &mut Ui| {
        heatmap(ui, matrix);
    });

    ui.add_space(8.0);
    ui.strong("Interpretation");
    ui.label(
        "• The final grade (G3) tracks the first two period grades (G1, G2) most closely.\n\
         • Parental education (Medu, Fedu) shows a weak positive link with outcomes.\n\
         • Past failures correlate strongly and negatively with G3.\n\
         • Study time has only a modest positive effect.\n\
         • Alcohol consumption (Dalc, Walc) is weakly negative.",
    );
}

/// Annotated grid of correlation coefficients, coolwarm coloured.
fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    const CELL: f32 = 38.0;
    const LABEL_W: f32 = 80.0;
    const LABEL_H: f32 = 22.0;

    let n = matrix.len();
    let size = Vec2::new(LABEL_W + CELL * n as f32, LABEL_H + CELL * n as f32);
    let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let origin = rect.min + Vec2::new(LABEL_W, LABEL_H);
    let label_font = FontId::proportional(10.0);
    let text_color = ui.visuals().text_color();

    for (i, name) in matrix.columns.iter().enumerate() {
        painter.text(
            rect.min + Vec2::new(LABEL_W - 4.0, LABEL_H + CELL * (i as f32 + 0.5)),
            Align2::RIGHT_CENTER,
            name,
            label_font.clone(),
            text_color,
        );
        painter.text(
            rect.min + Vec2::new(LABEL_W + CELL * (i as f32 + 0.5), LABEL_H / 2.0),
            Align2::CENTER_CENTER,
            name,
            label_font.clone(),
            text_color,
        );
    }

    for (i, row) in matrix.values.iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            let cell = Rect::from_min_size(
                origin + Vec2::new(CELL * j as f32, CELL * i as f32),
                Vec2::splat(CELL - 1.0),
            );
            let fill = color::diverging_color(r);
            painter.rect_filled(cell, 0.0, fill);
            painter.text(
                cell.center(),
                Align2::CENTER_CENTER,
                fmt_stat(r, 2),
                FontId::proportional(9.0),
                color::text_color_on(fill),
            );
        }
    }

    if let Some(pos) = response.hover_pos() {
        let cell = (pos - origin) / CELL;
        if cell.x >= 0.0 && cell.y >= 0.0 && (cell.x as usize) < n && (cell.y as usize) < n {
            let (i, j) = (cell.y as usize, cell.x as usize);
            response.on_hover_text(format!(
                "{} × {}: {}",
                matrix.columns[i],
                matrix.columns[j],
                fmt_stat(matrix.values[i][j], 3)
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Box plots
// ---------------------------------------------------------------------------

pub fn boxplot_tab(ui: &mut Ui, session: &mut DashboardSession) {
    ui.heading("📦 Boxplots — Numeric Feature Distributions");

    let numeric: Vec<String> = session
        .view()
        .numeric_columns()
        .map(|c| c.name().to_string())
        .collect();
    let current = session.box_feature.clone().unwrap_or_default();
    egui::ComboBox::from_label("Choose a numeric feature to visualize")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &numeric {
                if ui.selectable_label(current == *col, col).clicked() {
                    session.box_feature = Some(col.clone());
                }
            }
        });

    let Some(feature) = session.box_feature.clone() else {
        ui.label("No numeric columns available.");
        return;
    };
    let Some(stats) = stats::box_stats(session.view(), &feature) else {
        ui.label(RichText::new("No data available for this feature.").color(Color32::RED));
        return;
    };

    let spread = BoxSpread::new(
        stats.lower_whisker,
        stats.q1,
        stats.median,
        stats.q3,
        stats.upper_whisker,
    );
    let elem = BoxElem::new(0.5, spread)
        .name(&feature)
        .fill(color::ORANGE.gamma_multiply(0.7))
        .stroke(Stroke::new(1.5, color::FOREST))
        .whisker_width(0.3)
        .box_width(0.4);
    let outliers: PlotPoints = stats.outliers.iter().map(|&v| [0.5, v]).collect();

    Plot::new("box_plot")
        .legend(Legend::default())
        .height(380.0)
        .y_axis_label(&feature)
        .show_axes([false, true])
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![elem]).name(format!("Distribution of {feature}")));
            plot_ui.points(
                Points::new(outliers)
                    .radius(4.0)
                    .color(color::NEON_YELLOW)
                    .name("outliers"),
            );
        });

    ui.label(format!(
        "Median {}, IQR {}–{}, whiskers {}–{}, {} outlier(s).",
        fmt_stat(stats.median, 2),
        fmt_stat(stats.q1, 2),
        fmt_stat(stats.q3, 2),
        fmt_stat(stats.lower_whisker, 2),
        fmt_stat(stats.upper_whisker, 2),
        stats.outliers.len()
    ));
    ui.label(
        "The middle line is the median, the box spans the interquartile range and the \
         dots beyond the whiskers are outliers: students whose values differ greatly \
         from most of the class.",
    );
}

// ---------------------------------------------------------------------------
// Scatter insights
// ---------------------------------------------------------------------------

pub fn scatter_tab(ui: &mut Ui, session: &DashboardSession) {
    ui.heading("🫧 Studytime vs Final Grade (G3)");
    let view = session.view();
    if !(view.has_column(schema::STUDYTIME) && view.has_column(schema::FINAL_GRADE)) {
        ui.label("The studytime and G3 columns are required for this chart.");
        return;
    }
    grouped_scatter(
        ui,
        "studytime_scatter",
        view,
        (schema::STUDYTIME, schema::FINAL_GRADE),
        schema::SEX,
        Some(schema::ABSENCES),
    );
    ui.label(
        "Each point is a student. Bubble size reflects absences and colour the gender. \
         Higher study time (3–4) tends to go with better grades, while many absences \
         often go with lower grades even when study time is high.",
    );
}

/// Absences against the final grade, used by the insights tab.
pub fn absences_scatter(ui: &mut Ui, view: &Table) {
    grouped_scatter(
        ui,
        "absences_scatter",
        view,
        (schema::ABSENCES, schema::FINAL_GRADE),
        schema::SEX,
        None,
    );
}

/// Top / bottom correlation bars, used by the insights tab.
pub fn top_correlations(ui: &mut Ui, id: &str, pairs: &[(String, f64)], negative: bool) {
    if negative {
        correlation_bars(ui, id, pairs, color::PURPLE, color::CYAN);
    } else {
        correlation_bars(ui, id, pairs, color::NEON_YELLOW, color::ORANGE);
    }
}

/// Mean of the final grade per gender, used by the insights tab.
pub fn mean_by_group(ui: &mut Ui, means: &[(CellValue, f64)]) {
    let palette = [color::PINK, color::CYAN];
    let bars: Vec<Bar> = means
        .iter()
        .enumerate()
        .map(|(i, (key, m))| {
            Bar::new(i as f64, if m.is_nan() { 0.0 } else { *m })
                .name(format!("{key}: {}", fmt_stat(*m, 2)))
                .fill(palette[i % palette.len()])
                .width(0.6)
        })
        .collect();
    Plot::new("mean_by_gender")
        .legend(Legend::default())
        .height(220.0)
        .y_axis_label("Average Final Score")
        .show_axes([false, true])
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    #[test]
    fn point_details_list_present_hover_columns() {
        let view = Table::new(vec![
            Column::new("age", vec![CellValue::Integer(17), CellValue::Integer(18)]),
            Column::new("famsize", vec!["GT3".into(), CellValue::Null]),
            Column::new("failures", vec![CellValue::Integer(0), CellValue::Integer(2)]),
            Column::new("G3", vec![CellValue::Integer(12), CellValue::Integer(6)]),
        ])
        .unwrap();
        assert_eq!(point_details(&view, 0), "age 17, famsize GT3, failures 0");
        assert_eq!(point_details(&view, 1), "age 18, famsize <null>, failures 2");
    }
}
