use std::sync::Arc;

use crate::data::filter::{subset, FilterError, FilterPhase, FilterRegistry, FilterValue};
use crate::data::model::{CellValue, Table};
use crate::data::schema;
use crate::data::stats::{summaries, SummaryBundle};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Correlation,
    Boxplots,
    Scatter,
    Insights,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Correlation,
        Tab::Boxplots,
        Tab::Scatter,
        Tab::Insights,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Correlation => "Correlation Heatmap",
            Tab::Boxplots => "Boxplots",
            Tab::Scatter => "Scatter Insights",
            Tab::Insights => "Insights Section",
        }
    }
}

pub const PREVIEW_ROWS_RANGE: std::ops::RangeInclusive<usize> = 5..=30;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
///
/// The source table is shared and never modified. Every filter change runs a
/// single pass: registry update, then working subset, then summaries.
pub struct DashboardSession {
    table: Arc<Table>,
    filters: FilterRegistry,
    /// Rows passing the current filters (cached).
    view: Table,
    /// Summaries of `view` (cached).
    summary: SummaryBundle,

    /// Selected tab in the central panel.
    pub active_tab: Tab,

    /// Number of rows in the overview preview table.
    pub preview_rows: usize,

    /// Numeric column shown in the box-plot tab.
    pub box_feature: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl DashboardSession {
    pub fn new(table: Arc<Table>) -> Self {
        let mut filters = FilterRegistry::new();
        let seeded = filters.initialize(&table);
        log::info!("initialised {seeded} filter(s)");

        let box_feature = table
            .numeric_column(schema::FINAL_GRADE)
            .or_else(|| table.numeric_columns().next())
            .map(|c| c.name().to_string());

        let view = subset(&table, &filters);
        let summary = summaries(&view);
        Self {
            table,
            filters,
            view,
            summary,
            active_tab: Tab::default(),
            preview_rows: 10,
            box_feature,
            status_message: None,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn phase(&self) -> FilterPhase {
        self.filters.phase()
    }

    /// The current working subset.
    pub fn view(&self) -> &Table {
        &self.view
    }

    pub fn summary(&self) -> &SummaryBundle {
        &self.summary
    }

    /// Re-render hook, run at the start of every frame. Seeds filters for
    /// columns that have none yet, never touching existing selections, and
    /// recomputes only when something was seeded.
    pub fn refresh(&mut self) {
        if self.filters.initialize(&self.table) > 0 {
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        self.view = subset(&self.table, &self.filters);
        self.summary = summaries(&self.view);
        log::debug!(
            "recomputed view: {} of {} rows",
            self.view.n_rows(),
            self.table.n_rows()
        );
    }

    /// Apply a registry edit and recompute. A rejected edit leaves the state
    /// as it was and is reported in the status line.
    fn apply<F>(&mut self, edit: F) -> Result<(), FilterError>
    where
        F: FnOnce(&mut FilterRegistry) -> Result<(), FilterError>,
    {
        match edit(&mut self.filters) {
            Ok(()) => {
                self.status_message = None;
                self.recompute();
                Ok(())
            }
            Err(e) => {
                log::warn!("rejected filter selection: {e}");
                self.status_message = Some(format!("Invalid filter: {e}"));
                Err(e)
            }
        }
    }

    pub fn set_filter(&mut self, column: &str, value: FilterValue) -> Result<(), FilterError> {
        self.apply(|f| f.set(column, value))
    }

    /// Toggle a single value in a categorical filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let _ = self.apply(|f| f.toggle(column, value));
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        let _ = self.apply(|f| f.select_all(column));
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        let _ = self.apply(|f| f.select_none(column));
    }

    pub fn select_range(&mut self, column: &str, min: f64, max: f64) {
        let _ = self.set_filter(column, FilterValue::Range { min, max });
    }

    pub fn reset_filters(&mut self) {
        log::info!("resetting all filters");
        self.filters.reset();
        self.status_message = None;
        self.recompute();
    }

    /// Current summaries as pretty JSON; undefined statistics become `null`.
    pub fn summary_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.summary)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::Column;

    fn session() -> DashboardSession {
        let table = Table::new(vec![
            Column::new("sex", vec!["F".into(), "F".into(), "M".into()]),
            Column::new(
                "studytime",
                [1, 2, 4].into_iter().map(CellValue::Integer).collect(),
            ),
            Column::new(
                "G3",
                [12, 8, 15].into_iter().map(CellValue::Integer).collect(),
            ),
        ])
        .unwrap();
        DashboardSession::new(Arc::new(table))
    }

    #[test]
    fn new_session_shows_everything() {
        let s = session();
        assert_eq!(s.phase(), FilterPhase::Defaults);
        assert_eq!(s.view(), s.table());
        assert_eq!(s.box_feature.as_deref(), Some("G3"));
        assert_eq!(s.summary().overview.rows, 3);
    }

    #[test]
    fn filter_change_recomputes_view_and_summary() {
        let mut s = session();
        s.toggle_filter_value("sex", &"M".into());

        assert_eq!(s.view().n_rows(), 2);
        let grades = s.summary().grades.unwrap();
        assert_eq!(grades.mean, 10.0);
        assert_eq!(grades.pass_rate, 50.0);
        assert_eq!(s.phase(), FilterPhase::Custom);
    }

    #[test]
    fn rejected_selection_keeps_state_and_reports() {
        let mut s = session();
        s.select_range("studytime", 2.0, 4.0);
        let rows = s.view().n_rows();

        s.select_range("studytime", 0.0, 9.0);
        assert_eq!(s.view().n_rows(), rows);
        assert!(s.status_message.as_deref().unwrap().starts_with("Invalid filter"));
        assert_eq!(
            s.filters().get("studytime").unwrap().current_value(),
            &FilterValue::Range { min: 2.0, max: 4.0 }
        );
    }

    #[test]
    fn refresh_keeps_selections_and_reset_restores_defaults() {
        let mut s = session();
        s.select_none("sex");
        assert!(s.view().is_empty());
        assert_eq!(s.table().n_rows(), 3);
        assert_eq!(s.summary().overview.rows, 0);
        assert!(s.summary().grades.unwrap().mean.is_nan());

        s.refresh();
        assert!(s.view().is_empty());
        assert_eq!(
            s.filters().get("sex").unwrap().current_value(),
            &FilterValue::Categories(BTreeSet::new())
        );

        s.reset_filters();
        assert_eq!(s.phase(), FilterPhase::Defaults);
        assert_eq!(s.view().n_rows(), 3);
    }

    #[test]
    fn summary_json_contains_overview() {
        let mut s = session();
        s.select_none("sex");
        let json = s.summary_json().unwrap();
        assert!(json.contains("\"rows\": 0"));
        assert!(json.contains("\"mean\": null"));
    }
}
