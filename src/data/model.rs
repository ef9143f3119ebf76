use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
/// Used as a `BTreeSet` / `HashSet` key downstream, so `CellValue` must be
/// `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

// Equality follows `Ord` (floats by `total_cmp`), so it agrees with `Hash`.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::String(s) => serializer.serialize_str(s),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(v) => serializer.serialize_f64(*v),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Null => serializer.serialize_none(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric work.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }
}

// ---------------------------------------------------------------------------
// Column – a named, typed sequence of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<CellValue>,
}

impl Column {
    /// Build a column, inferring its kind from the values.
    ///
    /// A column is numeric when it holds at least one non-null cell and every
    /// non-null cell is an integer or a float.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let mut non_null = values.iter().filter(|v| !v.is_null()).peekable();
        let kind = if non_null.peek().is_some() && non_null.all(CellValue::is_numeric) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        };
        Self::with_kind(name, kind, values)
    }

    pub fn with_kind(name: impl Into<String>, kind: ColumnKind, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric view of the column: `None` for missing or non-numeric cells.
    pub fn numeric_values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(CellValue::as_f64).collect()
    }

    /// Present numeric values only, in row order.
    pub fn present_numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_f64).collect()
    }

    /// Sorted set of distinct values (including `Null` when present).
    pub fn unique_values(&self) -> BTreeSet<CellValue> {
        self.values.iter().cloned().collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            kind: self.kind,
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(TableError::DuplicateColumn(col.name().to_string()));
            }
            if col.len() != n_rows {
                return Err(TableError::LengthMismatch {
                    column: col.name().to_string(),
                    expected: n_rows,
                    found: col.len(),
                });
            }
        }
        Ok(Table { columns, n_rows })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The named column, only if it is numeric.
    pub fn numeric_column(&self, name: &str) -> Option<&Column> {
        self.column(name).filter(|c| c.is_numeric())
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// A new table holding the given rows (in the given order) of every column.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..n.min(self.n_rows)).collect();
        self.take_rows(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_kind_is_inferred_from_non_null_cells() {
        let numeric = Column::new("g", vec![CellValue::Integer(1), CellValue::Null, CellValue::Float(2.5)]);
        assert_eq!(numeric.kind(), ColumnKind::Numeric);

        let mixed = Column::new("m", vec![CellValue::Integer(1), "x".into()]);
        assert_eq!(mixed.kind(), ColumnKind::Categorical);

        let all_null = Column::new("n", vec![CellValue::Null, CellValue::Null]);
        assert_eq!(all_null.kind(), ColumnKind::Categorical);
    }

    #[test]
    fn float_equality_agrees_with_ordering_and_hash() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        fn hash_of(v: &CellValue) -> u64 {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        }

        let a = CellValue::Float(f64::NAN);
        let b = CellValue::Float(f64::NAN);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.0));
        let set: HashSet<CellValue> = [a, b, CellValue::Float(0.5)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn table_rejects_ragged_and_duplicate_columns() {
        let err = Table::new(vec![
            Column::new("a", vec![CellValue::Integer(1), CellValue::Integer(2)]),
            Column::new("b", vec![CellValue::Integer(1)]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::LengthMismatch {
                column: "b".into(),
                expected: 2,
                found: 1
            }
        );

        let err = Table::new(vec![
            Column::new("a", vec![CellValue::Integer(1)]),
            Column::new("a", vec![CellValue::Integer(2)]),
        ])
        .unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("a".into()));
    }

    #[test]
    fn take_rows_keeps_columns_and_kinds() {
        let table = Table::new(vec![
            Column::new("sex", vec!["F".into(), "M".into()]),
            Column::new("G3", vec![CellValue::Integer(12), CellValue::Integer(15)]),
        ])
        .unwrap();

        let empty = table.take_rows(&[]);
        assert_eq!(empty.n_rows(), 0);
        assert_eq!(empty.n_cols(), 2);
        assert!(empty.column("G3").unwrap().is_numeric());

        let second = table.take_rows(&[1]);
        assert_eq!(second.row(0), vec![&CellValue::from("M"), &CellValue::Integer(15)]);
    }

    #[test]
    fn ordering_groups_by_type_then_value() {
        let set: BTreeSet<CellValue> = [
            CellValue::from("b"),
            CellValue::Integer(2),
            CellValue::Null,
            CellValue::from("a"),
            CellValue::Integer(1),
        ]
        .into_iter()
        .collect();
        let ordered: Vec<String> = set.iter().map(|v| v.to_string()).collect();
        assert_eq!(ordered, vec!["<null>", "1", "2", "a", "b"]);
    }
}
