use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use super::model::{CellValue, Table};
use super::schema;

// ---------------------------------------------------------------------------
// Filter catalogue: which columns get a sidebar filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Rows pass when their value is one of the selected categories.
    Categorical,
    /// Rows pass when their numeric value lies in an inclusive `[min, max]`.
    Range,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Categorical => write!(f, "categorical"),
            FilterKind::Range => write!(f, "range"),
        }
    }
}

/// Declaration of a recognized filterable column.
#[derive(Debug, Clone, Copy)]
pub struct FilterDecl {
    pub column: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
}

pub const FILTERABLE_COLUMNS: &[FilterDecl] = &[
    FilterDecl {
        column: schema::SEX,
        label: "Filter by Gender",
        kind: FilterKind::Categorical,
    },
    FilterDecl {
        column: schema::SCHOOL,
        label: "Filter by School",
        kind: FilterKind::Categorical,
    },
    FilterDecl {
        column: schema::MOTHER_EDUCATION,
        label: "Mother's Education Level",
        kind: FilterKind::Categorical,
    },
    FilterDecl {
        column: schema::STUDYTIME,
        label: "Studytime (hours/week)",
        kind: FilterKind::Range,
    },
];

// ---------------------------------------------------------------------------
// Filter values and specs
// ---------------------------------------------------------------------------

/// A selection for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Categories(BTreeSet<CellValue>),
    Range { min: f64, max: f64 },
}

impl FilterValue {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Categories(_) => FilterKind::Categorical,
            FilterValue::Range { .. } => FilterKind::Range,
        }
    }

    /// Whether a single cell satisfies this selection.
    ///
    /// A `Null` cell matches a categorical selection only if `Null` is
    /// selected, and never matches a range.
    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            FilterValue::Categories(selected) => selected.contains(value),
            FilterValue::Range { min, max } => value
                .as_f64()
                .is_some_and(|v| *min <= v && v <= *max),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("no filter is registered for column '{0}'")]
    UnknownColumn(String),
    #[error("column '{column}' takes a {expected} selection")]
    KindMismatch { column: String, expected: FilterKind },
    #[error("'{value}' is not a value of column '{column}'")]
    NotInDomain { column: String, value: String },
    #[error("range bounds for '{column}' must be numbers")]
    NotANumber { column: String },
    #[error("range {min}..={max} for '{column}' is inverted")]
    InvertedRange { column: String, min: f64, max: f64 },
    #[error("range {min}..={max} for '{column}' exceeds the observed {lower}..={upper}")]
    OutOfBounds {
        column: String,
        min: f64,
        max: f64,
        lower: f64,
        upper: f64,
    },
}

/// Filter state for a single column. The default is computed once from the
/// unfiltered table and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    column: String,
    label: String,
    default_value: FilterValue,
    current_value: FilterValue,
}

impl FilterSpec {
    /// Derive a spec from the unfiltered table. Returns `None` when the column
    /// is absent, or when a range filter has no numeric values to bound it.
    pub fn from_table(decl: &FilterDecl, table: &Table) -> Option<Self> {
        let column = table.column(decl.column)?;
        let default_value = match decl.kind {
            FilterKind::Categorical => FilterValue::Categories(column.unique_values()),
            FilterKind::Range => {
                if !column.is_numeric() {
                    log::warn!("range filter column '{}' is not numeric, skipping", decl.column);
                    return None;
                }
                let numbers = column.present_numbers();
                if numbers.is_empty() {
                    return None;
                }
                let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
                let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                FilterValue::Range { min, max }
            }
        };
        Some(FilterSpec {
            column: decl.column.to_string(),
            label: decl.label.to_string(),
            current_value: default_value.clone(),
            default_value,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FilterKind {
        self.default_value.kind()
    }

    pub fn default_value(&self) -> &FilterValue {
        &self.default_value
    }

    pub fn current_value(&self) -> &FilterValue {
        &self.current_value
    }

    pub fn is_default(&self) -> bool {
        self.current_value == self.default_value
    }

    /// Human-readable text for the current selection.
    pub fn describe_selection(&self) -> String {
        match &self.current_value {
            FilterValue::Categories(selected) if selected.is_empty() => "none".to_string(),
            FilterValue::Categories(selected) => selected
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            FilterValue::Range { min, max } => format!("{min}–{max}"),
        }
    }

    fn validate(&self, value: &FilterValue) -> Result<(), FilterError> {
        let column = || self.column.clone();
        match (&self.default_value, value) {
            (FilterValue::Categories(domain), FilterValue::Categories(selected)) => {
                match selected.iter().find(|v| !domain.contains(*v)) {
                    Some(v) => Err(FilterError::NotInDomain {
                        column: column(),
                        value: v.to_string(),
                    }),
                    None => Ok(()),
                }
            }
            (
                FilterValue::Range { min: lower, max: upper },
                FilterValue::Range { min, max },
            ) => {
                if min.is_nan() || max.is_nan() {
                    Err(FilterError::NotANumber { column: column() })
                } else if min > max {
                    Err(FilterError::InvertedRange {
                        column: column(),
                        min: *min,
                        max: *max,
                    })
                } else if min < lower || max > upper {
                    Err(FilterError::OutOfBounds {
                        column: column(),
                        min: *min,
                        max: *max,
                        lower: *lower,
                        upper: *upper,
                    })
                } else {
                    Ok(())
                }
            }
            _ => Err(FilterError::KindMismatch {
                column: column(),
                expected: self.kind(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Lifecycle of the filter session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    Uninitialized,
    /// Every filter is at its default.
    Defaults,
    /// At least one filter holds a user selection.
    Custom,
}

/// All sidebar filters of a session, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    specs: Vec<FilterSpec>,
    initialized: bool,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a spec for every recognized column present in `table` that does
    /// not have one yet. Existing specs, and the selections they hold, are
    /// left untouched. Returns how many specs were added.
    pub fn initialize(&mut self, table: &Table) -> usize {
        let mut seeded = 0;
        for decl in FILTERABLE_COLUMNS {
            if self.get(decl.column).is_some() {
                continue;
            }
            if let Some(spec) = FilterSpec::from_table(decl, table) {
                log::debug!("seeded {} filter for '{}'", decl.kind, decl.column);
                self.specs.push(spec);
                seeded += 1;
            }
        }
        self.initialized = true;
        seeded
    }

    pub fn phase(&self) -> FilterPhase {
        if !self.initialized {
            FilterPhase::Uninitialized
        } else if self.specs.iter().all(FilterSpec::is_default) {
            FilterPhase::Defaults
        } else {
            FilterPhase::Custom
        }
    }

    pub fn specs(&self) -> &[FilterSpec] {
        &self.specs
    }

    pub fn get(&self, column: &str) -> Option<&FilterSpec> {
        self.specs.iter().find(|s| s.column == column)
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Replace the selection of `column`. Invalid selections are rejected and
    /// leave the registry unchanged. An empty category set is valid.
    pub fn set(&mut self, column: &str, value: FilterValue) -> Result<(), FilterError> {
        let spec = self
            .specs
            .iter_mut()
            .find(|s| s.column == column)
            .ok_or_else(|| FilterError::UnknownColumn(column.to_string()))?;
        spec.validate(&value)?;
        spec.current_value = value;
        Ok(())
    }

    /// Add `value` to or remove it from a categorical selection.
    pub fn toggle(&mut self, column: &str, value: &CellValue) -> Result<(), FilterError> {
        let spec = self
            .get(column)
            .ok_or_else(|| FilterError::UnknownColumn(column.to_string()))?;
        let FilterValue::Categories(selected) = spec.current_value() else {
            return Err(FilterError::KindMismatch {
                column: column.to_string(),
                expected: spec.kind(),
            });
        };
        let mut selected = selected.clone();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.set(column, FilterValue::Categories(selected))
    }

    /// Restore the default selection of one column.
    pub fn select_all(&mut self, column: &str) -> Result<(), FilterError> {
        let default = self
            .get(column)
            .map(|s| s.default_value.clone())
            .ok_or_else(|| FilterError::UnknownColumn(column.to_string()))?;
        self.set(column, default)
    }

    /// Clear a categorical selection.
    pub fn select_none(&mut self, column: &str) -> Result<(), FilterError> {
        self.set(column, FilterValue::Categories(BTreeSet::new()))
    }

    /// Return every filter to its default.
    pub fn reset(&mut self) {
        for spec in &mut self.specs {
            spec.current_value = spec.default_value.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Applying filters
// ---------------------------------------------------------------------------

/// Return indices of rows that pass all filters.
///
/// A row passes a filter when:
/// * The filter is at its default → passes (no constraint)
/// * The row's value for that column matches the current selection
pub fn filtered_indices(table: &Table, registry: &FilterRegistry) -> Vec<usize> {
    let active: Vec<(&[CellValue], &FilterValue)> = registry
        .specs()
        .iter()
        .filter(|spec| !spec.is_default())
        .filter_map(|spec| {
            let column = table.column(spec.column())?;
            Some((column.values(), spec.current_value()))
        })
        .collect();

    (0..table.n_rows())
        .filter(|&row| active.iter().all(|(values, sel)| sel.matches(&values[row])))
        .collect()
}

/// The working subset: the rows of `table` that pass every filter.
pub fn subset(table: &Table, registry: &FilterRegistry) -> Table {
    table.take_rows(&filtered_indices(table, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn cats(values: &[&str]) -> FilterValue {
        FilterValue::Categories(values.iter().map(|v| CellValue::from(*v)).collect())
    }

    fn students() -> Table {
        Table::new(vec![
            Column::new("sex", vec!["F".into(), "F".into(), "M".into(), "M".into()]),
            Column::new("school", vec!["GP".into(), "MS".into(), "GP".into(), "GP".into()]),
            Column::new(
                "studytime",
                [1, 2, 3, 4].into_iter().map(CellValue::Integer).collect(),
            ),
            Column::new(
                "G3",
                [12, 8, 15, 10].into_iter().map(CellValue::Integer).collect(),
            ),
        ])
        .unwrap()
    }

    fn ready(table: &Table) -> FilterRegistry {
        let mut registry = FilterRegistry::new();
        registry.initialize(table);
        registry
    }

    #[test]
    fn initialize_seeds_only_present_columns() {
        let table = students();
        let mut registry = FilterRegistry::new();
        assert_eq!(registry.phase(), FilterPhase::Uninitialized);

        assert_eq!(registry.initialize(&table), 3);
        assert_eq!(registry.phase(), FilterPhase::Defaults);
        assert!(registry.get("Medu").is_none());
        assert_eq!(registry.get("sex").unwrap().default_value(), &cats(&["F", "M"]));
        assert_eq!(
            registry.get("studytime").unwrap().default_value(),
            &FilterValue::Range { min: 1.0, max: 4.0 }
        );
    }

    #[test]
    fn reinitialize_keeps_user_selections() {
        let table = students();
        let mut registry = ready(&table);
        registry.set("sex", cats(&["F"])).unwrap();
        registry
            .set("studytime", FilterValue::Range { min: 2.0, max: 3.0 })
            .unwrap();
        let before = registry.specs().to_vec();

        assert_eq!(registry.initialize(&table), 0);
        assert_eq!(registry.specs(), &before[..]);
        assert_eq!(registry.phase(), FilterPhase::Custom);
    }

    #[test]
    fn reset_restores_every_default_and_is_idempotent() {
        let table = students();
        let mut registry = ready(&table);
        registry.set("sex", cats(&[])).unwrap();
        registry.set("school", cats(&["MS"])).unwrap();
        registry
            .set("studytime", FilterValue::Range { min: 2.0, max: 2.0 })
            .unwrap();
        registry.toggle("school", &"GP".into()).unwrap();

        registry.reset();
        registry.reset();
        assert_eq!(registry.phase(), FilterPhase::Defaults);
        for spec in registry.specs() {
            assert_eq!(spec.current_value(), spec.default_value());
        }
    }

    #[test]
    fn defaults_never_change() {
        let table = students();
        let mut registry = ready(&table);
        let defaults: Vec<FilterValue> = registry
            .specs()
            .iter()
            .map(|s| s.default_value().clone())
            .collect();

        registry.set("sex", cats(&["M"])).unwrap();
        registry.select_none("school").unwrap();
        registry.reset();
        registry.toggle("sex", &"F".into()).unwrap();

        let after: Vec<FilterValue> = registry
            .specs()
            .iter()
            .map(|s| s.default_value().clone())
            .collect();
        assert_eq!(defaults, after);
    }

    #[test]
    fn invalid_selections_are_rejected_without_changes() {
        let table = students();
        let mut registry = ready(&table);
        registry.set("sex", cats(&["F"])).unwrap();
        let before = registry.specs().to_vec();

        assert_eq!(
            registry.set("sex", cats(&["F", "X"])),
            Err(FilterError::NotInDomain {
                column: "sex".into(),
                value: "X".into()
            })
        );
        assert!(matches!(
            registry.set("studytime", FilterValue::Range { min: 0.0, max: 3.0 }),
            Err(FilterError::OutOfBounds { .. })
        ));
        assert!(matches!(
            registry.set("studytime", FilterValue::Range { min: 3.0, max: 2.0 }),
            Err(FilterError::InvertedRange { .. })
        ));
        assert!(matches!(
            registry.set("studytime", FilterValue::Range { min: f64::NAN, max: 2.0 }),
            Err(FilterError::NotANumber { .. })
        ));
        assert!(matches!(
            registry.set("sex", FilterValue::Range { min: 1.0, max: 2.0 }),
            Err(FilterError::KindMismatch { .. })
        ));
        assert_eq!(
            registry.set("Medu", cats(&[])),
            Err(FilterError::UnknownColumn("Medu".into()))
        );
        assert_eq!(registry.specs(), &before[..]);
    }

    #[test]
    fn defaults_select_the_full_table() {
        let table = students();
        let registry = ready(&table);
        assert_eq!(subset(&table, &registry), table);
    }

    #[test]
    fn defaults_keep_rows_with_missing_values() {
        let table = Table::new(vec![
            Column::new("sex", vec!["F".into(), CellValue::Null]),
            Column::new("studytime", vec![CellValue::Integer(2), CellValue::Null]),
        ])
        .unwrap();
        let registry = ready(&table);
        assert_eq!(subset(&table, &registry).n_rows(), 2);
    }

    #[test]
    fn gender_filter_selects_matching_rows() {
        let table = Table::new(vec![
            Column::new("sex", vec!["F".into(), "F".into(), "M".into()]),
            Column::new(
                "G3",
                [12, 8, 15].into_iter().map(CellValue::Integer).collect(),
            ),
        ])
        .unwrap();
        let mut registry = ready(&table);
        registry.set("sex", cats(&["F"])).unwrap();

        let view = subset(&table, &registry);
        assert_eq!(view.n_rows(), 2);
        assert_eq!(view.row(0), vec![&CellValue::from("F"), &CellValue::Integer(12)]);
        assert_eq!(view.row(1), vec![&CellValue::from("F"), &CellValue::Integer(8)]);
    }

    #[test]
    fn studytime_range_is_inclusive() {
        let table = students();
        let mut registry = ready(&table);
        registry
            .set("studytime", FilterValue::Range { min: 2.0, max: 3.0 })
            .unwrap();

        let view = subset(&table, &registry);
        let kept: Vec<f64> = view.column("studytime").unwrap().present_numbers();
        assert_eq!(kept, vec![2.0, 3.0]);
    }

    #[test]
    fn empty_selection_yields_empty_subset() {
        let table = students();
        let mut registry = ready(&table);
        registry.select_none("school").unwrap();

        let view = subset(&table, &registry);
        assert_eq!(view.n_rows(), 0);
        assert_eq!(view.n_cols(), table.n_cols());
        assert!(view.n_rows() <= table.n_rows());
    }

    #[test]
    fn filters_combine_as_conjunction() {
        let table = students();
        let mut registry = ready(&table);
        registry.set("sex", cats(&["M"])).unwrap();
        registry.set("school", cats(&["GP"])).unwrap();
        registry
            .set("studytime", FilterValue::Range { min: 1.0, max: 3.0 })
            .unwrap();

        assert_eq!(filtered_indices(&table, &registry), vec![2]);
    }

    #[test]
    fn non_numeric_range_column_gets_no_filter() {
        let table = Table::new(vec![
            Column::new("studytime", vec!["lots".into()]),
            Column::new("sex", vec!["F".into()]),
        ])
        .unwrap();
        let registry = ready(&table);
        assert!(registry.get("studytime").is_none());
        assert_eq!(registry.specs().len(), 1);
    }

    #[test]
    fn describe_selection_formats_values() {
        let table = students();
        let mut registry = ready(&table);
        assert_eq!(registry.get("sex").unwrap().describe_selection(), "F, M");
        registry.select_none("sex").unwrap();
        assert_eq!(registry.get("sex").unwrap().describe_selection(), "none");
        assert_eq!(registry.get("studytime").unwrap().describe_selection(), "1–4");
    }
}
