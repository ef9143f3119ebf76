use eframe::egui::{RichText, Ui};

use crate::data::schema;
use crate::data::stats;
use crate::session::DashboardSession;
use crate::ui::panels::fmt_stat;
use crate::ui::plot;

/// How many features the top/bottom correlation charts show.
const RANKED_FEATURES: usize = 5;

/// The first `n` defined entries of a descending correlation ranking.
fn strongest(ranked: &[(String, f64)], n: usize) -> Vec<(String, f64)> {
    ranked.iter().filter(|(_, r)| !r.is_nan()).take(n).cloned().collect()
}

/// The last `n` defined entries, most negative first.
fn weakest(ranked: &[(String, f64)], n: usize) -> Vec<(String, f64)> {
    let mut defined: Vec<(String, f64)> = ranked.iter().filter(|(_, r)| !r.is_nan()).cloned().collect();
    defined.reverse();
    defined.truncate(n);
    defined
}

fn question(ui: &mut Ui, text: &str) {
    ui.add_space(10.0);
    ui.label(RichText::new(text).strong().size(15.0));
}

pub fn insights_tab(ui: &mut Ui, session: &DashboardSession) {
    ui.heading("🔑 Key Questions & Insights");
    let view = session.view();
    if view.is_empty() {
        ui.label("No data available with the selected filters.");
        return;
    }

    let ranked = stats::correlations_against(view, schema::FINAL_GRADE);

    // Q1
    if let Some(ranked) = &ranked {
        question(ui, "Q1. Which features have the highest correlation with the final exam scores (G3)?");
        let top = strongest(ranked, RANKED_FEATURES);
        plot::top_correlations(ui, "top_correlations", &top, false);
        ui.label(
            "These variables are most strongly associated with the final grade. Earlier \
             grades (G1, G2) usually dominate, so early performance is the best signal \
             for spotting students at risk.",
        );
    }

    // Q2 + Q3
    if let Some(r) = stats::correlation_with(view, schema::STUDYTIME, schema::FINAL_GRADE) {
        question(ui, "Q2. How does study time correlate with exam performance?");
        ui.label(format!(
            "The correlation between study time and the final grade is {}. A positive value \
             means students who study longer tend to do better; a weak one means hours alone \
             do not guarantee success.",
            fmt_stat(r, 2)
        ));

        question(ui, "Q3. What insights can you draw from the boxplot?");
        ui.label(
            "The median shows the central tendency, the box size shows how much typical \
             performance varies, and outliers mark exceptional achievers or students who \
             may need help.",
        );
    }

    // Q4
    if let Some(means) = stats::grouped_mean(view, schema::SEX, schema::FINAL_GRADE) {
        question(ui, "Q4. How does gender impact the final exam score?");
        plot::mean_by_group(ui, &means);
        ui.label(
            "The gap between the groups is small, so gender alone does not determine \
             performance; study habits, family support and attendance matter more.",
        );
    }

    // Q5
    if let Some(r) = stats::correlation_with(view, schema::ABSENCES, schema::FINAL_GRADE) {
        question(ui, "Q5. Do absences affect grades?");
        ui.label(format!(
            "Correlation between absences and the final grade: {} ({} relationship).",
            fmt_stat(r, 2),
            stats::correlation_strength(r)
        ));
        plot::absences_scatter(ui, view);
        ui.label(
            "Students who attend more classes tend to perform better, though some do well \
             despite frequent absences.",
        );
    }

    // Q6
    if let Some(ranked) = &ranked {
        question(ui, "Q6. Which features are most negatively correlated with G3?");
        let bottom = weakest(ranked, RANKED_FEATURES);
        plot::top_correlations(ui, "bottom_correlations", &bottom, true);
        ui.label(
            "High absences, more failures or risky lifestyle choices tend to show up here. \
             They act as risk indicators rather than causes.",
        );

        ui.separator();
        ui.heading("Summary & Key Insights");
        ui.label(
            "• Grades are cumulative: G3 follows G1 and G2 closely.\n\
             • Demographics such as parental education and school have modest effects.\n\
             • Lifestyle factors and absences slightly reduce performance.\n\
             • More study time helps, but far less than prior grades.\n\
             • Early intervention after G1/G2 and support for at-risk students can improve outcomes.",
        );
    }
}
