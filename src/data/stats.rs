//! Aggregate summaries over a (filtered) table.
//!
//! Every function here is pure. Statistics that are undefined for the input
//! (no rows, a single observation for a spread, a constant column for a
//! correlation) come back as `NaN`, never as an error and never as zero.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::model::{CellValue, Table};
use super::schema;

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Arithmetic mean, `NaN` for an empty slice.
pub fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), `NaN` below two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean_of(values);
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    var.sqrt()
}

/// Quantile `q` in `[0, 1]` of an ascending slice, linearly interpolated
/// between the closest ranks. `NaN` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Pearson correlation over the pairs where both sides are present.
///
/// `NaN` with fewer than two complete pairs or when either side has zero
/// variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Wording used by the insights tab for a correlation coefficient.
pub fn correlation_strength(r: f64) -> &'static str {
    if r.is_nan() {
        "undefined"
    } else if r < -0.3 {
        "moderate negative"
    } else if r < 0.0 {
        "weak negative"
    } else {
        "little to no"
    }
}

// ---------------------------------------------------------------------------
// Column-level summaries
// ---------------------------------------------------------------------------

/// Mean of a numeric column; `None` if the column is absent or not numeric.
pub fn mean(table: &Table, column: &str) -> Option<f64> {
    let col = table.numeric_column(column)?;
    Some(mean_of(&col.present_numbers()))
}

/// Percentage of rows whose `column` value is at least `threshold`.
/// Missing cells count as failing; `NaN` for an empty table.
pub fn pass_rate(table: &Table, column: &str, threshold: f64) -> Option<f64> {
    let col = table.numeric_column(column)?;
    if col.is_empty() {
        return Some(f64::NAN);
    }
    let passed = col
        .numeric_values()
        .iter()
        .filter(|v| v.is_some_and(|v| v >= threshold))
        .count();
    Some(passed as f64 / col.len() as f64 * 100.0)
}

/// Correlation between two numeric columns.
pub fn correlation_with(table: &Table, column: &str, target: &str) -> Option<f64> {
    let a = table.numeric_column(column)?;
    let b = table.numeric_column(target)?;
    Some(pearson(&a.numeric_values(), &b.numeric_values()))
}

/// Correlation of every other numeric column against `target`, strongest
/// positive first. Undefined correlations sort last.
pub fn correlations_against(table: &Table, target: &str) -> Option<Vec<(String, f64)>> {
    let target_values = table.numeric_column(target)?.numeric_values();
    let mut out: Vec<(String, f64)> = table
        .numeric_columns()
        .filter(|c| c.name() != target)
        .map(|c| (c.name().to_string(), pearson(&c.numeric_values(), &target_values)))
        .collect();
    out.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (false, false) => b.1.total_cmp(&a.1),
        (nan_a, nan_b) => nan_a.cmp(&nan_b),
    });
    Some(out)
}

/// Mean of `target` per distinct value of `group`, keys in ascending order.
/// Rows with a missing key are dropped; a group with no present targets has
/// a `NaN` mean.
pub fn grouped_mean(table: &Table, group: &str, target: &str) -> Option<Vec<(CellValue, f64)>> {
    let keys = table.column(group)?;
    let values = table.numeric_column(target)?.numeric_values();

    let mut groups: BTreeMap<&CellValue, Vec<f64>> = BTreeMap::new();
    for (key, value) in keys.values().iter().zip(values) {
        if key.is_null() {
            continue;
        }
        let bucket = groups.entry(key).or_default();
        if let Some(v) = value {
            bucket.push(v);
        }
    }
    Some(
        groups
            .into_iter()
            .map(|(key, vals)| (key.clone(), mean_of(&vals)))
            .collect(),
    )
}

/// Occurrences of each distinct non-missing value, most frequent first; ties
/// keep first-appearance order.
pub fn value_counts(table: &Table, column: &str) -> Option<Vec<(CellValue, usize)>> {
    let col = table.column(column)?;
    let mut counts: Vec<(CellValue, usize)> = Vec::new();
    for value in col.values().iter().filter(|v| !v.is_null()) {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Some(counts)
}

/// Five-number summary plus outliers, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Box-plot statistics of a numeric column; `None` when absent, non-numeric
/// or without present values.
pub fn box_stats(table: &Table, column: &str) -> Option<BoxStats> {
    let sorted = sorted_copy(&table.numeric_column(column)?.present_numbers());
    if sorted.is_empty() {
        return None;
    }
    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside.clone().next().unwrap_or(q1);
    let upper_whisker = inside.last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxStats {
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

// ---------------------------------------------------------------------------
// Table-level summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub rows: usize,
    pub columns: usize,
    /// Missing cells across the whole table.
    pub missing: usize,
    /// Rows identical to an earlier row.
    pub duplicates: usize,
}

pub fn overview(table: &Table) -> Overview {
    let missing = table.columns().iter().map(|c| c.missing_count()).sum();

    let mut seen = HashSet::with_capacity(table.n_rows());
    let duplicates = (0..table.n_rows())
        .filter(|&i| !seen.insert(table.row(i)))
        .count();

    Overview {
        rows: table.n_rows(),
        columns: table.n_cols(),
        missing,
        duplicates,
    }
}

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescribeRow {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

/// One row of descriptive statistics per numeric column, in column order.
pub fn describe(table: &Table) -> Vec<DescribeRow> {
    table
        .numeric_columns()
        .map(|col| {
            let sorted = sorted_copy(&col.present_numbers());
            DescribeRow {
                column: col.name().to_string(),
                count: sorted.len(),
                mean: mean_of(&sorted),
                std: std_dev(&sorted),
                min: sorted.first().copied().unwrap_or(f64::NAN),
                q25: quantile_sorted(&sorted, 0.25),
                median: quantile_sorted(&sorted, 0.5),
                q75: quantile_sorted(&sorted, 0.75),
                max: sorted.last().copied().unwrap_or(f64::NAN),
            }
        })
        .collect()
}

/// Square matrix of pairwise Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `values[i][j]` correlates `columns[i]` with `columns[j]`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn from_table(table: &Table) -> Self {
        let numeric: Vec<_> = table.numeric_columns().collect();
        let series: Vec<Vec<Option<f64>>> = numeric.iter().map(|c| c.numeric_values()).collect();
        let n = series.len();

        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(&series[i], &series[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        CorrelationMatrix {
            columns: numeric.iter().map(|c| c.name().to_string()).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Headline metrics over the final grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeMetrics {
    pub mean: f64,
    /// Percentage of students at or above the pass mark.
    pub pass_rate: f64,
}

/// Everything the dashboard shows about the current working subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBundle {
    pub overview: Overview,
    pub describe: Vec<DescribeRow>,
    pub correlations: CorrelationMatrix,
    /// `None` when the table has no numeric final-grade column.
    pub grades: Option<GradeMetrics>,
}

pub fn summaries(table: &Table) -> SummaryBundle {
    let grades = mean(table, schema::FINAL_GRADE).zip(pass_rate(
        table,
        schema::FINAL_GRADE,
        schema::PASS_THRESHOLD,
    ));
    SummaryBundle {
        overview: overview(table),
        describe: describe(table),
        correlations: CorrelationMatrix::from_table(table),
        grades: grades.map(|(mean, pass_rate)| GradeMetrics { mean, pass_rate }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().copied().map(CellValue::Integer).collect()
    }

    fn grades_table() -> Table {
        Table::new(vec![
            Column::new("sex", vec!["F".into(), "F".into()]),
            Column::new("G3", ints(&[12, 8])),
        ])
        .unwrap()
    }

    #[test]
    fn mean_and_pass_rate_of_filtered_grades() {
        let table = grades_table();
        assert_eq!(mean(&table, "G3"), Some(10.0));
        assert_eq!(pass_rate(&table, "G3", 10.0), Some(50.0));
        assert_eq!(mean(&table, "sex"), None);
        assert_eq!(mean(&table, "G1"), None);
    }

    #[test]
    fn empty_table_gives_zero_counts_and_undefined_statistics() {
        let table = Table::new(vec![
            Column::new("sex", vec!["F".into()]),
            Column::new("G1", ints(&[10])),
            Column::new("G3", ints(&[12])),
        ])
        .unwrap()
        .take_rows(&[]);

        let bundle = summaries(&table);
        assert_eq!(
            bundle.overview,
            Overview {
                rows: 0,
                columns: 3,
                missing: 0,
                duplicates: 0
            }
        );
        let grades = bundle.grades.unwrap();
        assert!(grades.mean.is_nan());
        assert!(grades.pass_rate.is_nan());

        assert_eq!(bundle.describe.len(), 2);
        for row in &bundle.describe {
            assert_eq!(row.count, 0);
            assert!(row.mean.is_nan() && row.std.is_nan() && row.median.is_nan());
        }
        assert!(bundle.correlations.values.iter().flatten().all(|r| r.is_nan()));
        assert_eq!(grouped_mean(&table, "sex", "G3"), Some(vec![]));
        assert_eq!(box_stats(&table, "G3"), None);
    }

    #[test]
    fn self_correlation_is_exactly_one() {
        let table = Table::new(vec![
            Column::new("a", vec![0.1.into(), 0.7.into(), 3.3.into(), 1.9.into()]),
            Column::new("b", ints(&[5, 3, 9, 1])),
        ])
        .unwrap();
        assert_eq!(correlation_with(&table, "a", "a"), Some(1.0));
        let matrix = CorrelationMatrix::from_table(&table);
        assert_eq!(matrix.columns, vec!["a", "b"]);
        assert_eq!(matrix.values[1][1], 1.0);
        assert_eq!(matrix.values[0][1], matrix.values[1][0]);
    }

    #[test]
    fn constant_column_correlation_is_undefined() {
        let table = Table::new(vec![
            Column::new("c", ints(&[4, 4, 4])),
            Column::new("g", ints(&[1, 2, 3])),
        ])
        .unwrap();
        assert!(correlation_with(&table, "c", "g").unwrap().is_nan());
        assert!(correlation_with(&table, "c", "c").unwrap().is_nan());
    }

    #[test]
    fn pearson_skips_incomplete_pairs() {
        let x = [Some(1.0), Some(2.0), None, Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(100.0), Some(6.0)];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
        let inverse = [Some(3.0), Some(2.0), Some(0.0), Some(1.0)];
        assert!((pearson(&x, &inverse) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn describe_matches_dataframe_conventions() {
        let table = Table::new(vec![Column::new("g", ints(&[4, 1, 3, 2]))]).unwrap();
        let row = &describe(&table)[0];
        assert_eq!(row.count, 4);
        assert_eq!(row.mean, 2.5);
        assert!((row.std - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(row.min, 1.0);
        assert_eq!(row.q25, 1.75);
        assert_eq!(row.median, 2.5);
        assert_eq!(row.q75, 3.25);
        assert_eq!(row.max, 4.0);
    }

    #[test]
    fn overview_counts_missing_cells_and_duplicate_rows() {
        let table = Table::new(vec![
            Column::new("sex", vec!["F".into(), "F".into(), "M".into(), "F".into()]),
            Column::new(
                "G3",
                vec![
                    CellValue::Integer(10),
                    CellValue::Integer(10),
                    CellValue::Null,
                    CellValue::Integer(10),
                ],
            ),
        ])
        .unwrap();
        let o = overview(&table);
        assert_eq!(o.missing, 1);
        assert_eq!(o.duplicates, 2);
    }

    #[test]
    fn rows_holding_identical_nan_floats_are_duplicates() {
        let table = Table::new(vec![
            Column::new("sex", vec!["F".into(), "F".into()]),
            Column::new("score", vec![CellValue::Float(f64::NAN), CellValue::Float(f64::NAN)]),
        ])
        .unwrap();
        assert_eq!(overview(&table).duplicates, 1);
    }

    #[test]
    fn correlations_against_target_sort_descending_with_nan_last() {
        let table = Table::new(vec![
            Column::new("up", ints(&[1, 2, 3])),
            Column::new("flat", ints(&[7, 7, 7])),
            Column::new("down", ints(&[3, 2, 1])),
            Column::new("G3", ints(&[5, 10, 15])),
        ])
        .unwrap();
        let ranked = correlations_against(&table, "G3").unwrap();
        let names: Vec<&str> = ranked.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["up", "down", "flat"]);
        assert!(ranked[2].1.is_nan());
    }

    #[test]
    fn grouped_mean_and_value_counts() {
        let table = Table::new(vec![
            Column::new(
                "sex",
                vec!["M".into(), "F".into(), "F".into(), CellValue::Null],
            ),
            Column::new("G3", ints(&[15, 12, 8, 20])),
        ])
        .unwrap();
        assert_eq!(
            grouped_mean(&table, "sex", "G3"),
            Some(vec![("F".into(), 10.0), ("M".into(), 15.0)])
        );
        assert_eq!(
            value_counts(&table, "sex"),
            Some(vec![("F".into(), 2), ("M".into(), 1)])
        );
    }

    #[test]
    fn box_stats_flag_outliers_beyond_whiskers() {
        let table = Table::new(vec![Column::new("absences", ints(&[1, 2, 3, 4, 5, 40]))]).unwrap();
        let stats = box_stats(&table, "absences").unwrap();
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);
        assert_eq!(stats.outliers, vec![40.0]);
    }

    #[test]
    fn strength_wording_follows_thresholds() {
        assert_eq!(correlation_strength(-0.5), "moderate negative");
        assert_eq!(correlation_strength(-0.1), "weak negative");
        assert_eq!(correlation_strength(0.2), "little to no");
        assert_eq!(correlation_strength(f64::NAN), "undefined");
    }

    #[test]
    fn summary_serializes_undefined_values_as_null() {
        let table = grades_table().take_rows(&[]);
        let json = serde_json::to_value(summaries(&table)).unwrap();
        assert_eq!(json["grades"]["mean"], serde_json::Value::Null);
        assert_eq!(json["overview"]["rows"], 0);
        assert_eq!(json["describe"][0]["25%"], serde_json::Value::Null);
    }
}
