use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a spreadsheet export produces.
/// Used as a key in `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

// Equality agrees with `Ord` and `Hash`: floats compare bitwise, so NaN == NaN.
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
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
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
    /// Interpret the value as an `f64` when it already holds a number.
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
}

static NULL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// Dynamic columns of a single row: column_name → value.
pub type Record = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An ordered table of records with pre-computed column indices.
///
/// Every transform in the pipeline builds a new `Dataset`; the loaded one is kept
/// untouched as the source for re-filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// All rows, in source order.
    pub rows: Vec<Record>,
    /// Column names in display order.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    #[serde(skip)]
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Dataset {
    /// Build a dataset keeping the given column order (e.g. a CSV header).
    /// Columns only present in some rows are appended in sorted order.
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        let mut column_names = columns;
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();
        for name in &column_names {
            unique_values.entry(name.clone()).or_default();
        }

        let mut extra: BTreeSet<String> = BTreeSet::new();
        for row in &rows {
            for (col, val) in row {
                if !unique_values.contains_key(col) {
                    extra.insert(col.clone());
                }
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        column_names.extend(extra);

        Dataset {
            rows,
            column_names,
            unique_values,
        }
    }

    /// Build column indices from the rows alone (sorted column order).
    pub fn from_records(rows: Vec<Record>) -> Self {
        Self::new(Vec::new(), rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.unique_values.contains_key(column)
    }

    /// Cell at `(row, column)`; absent cells read as `Null`.
    pub fn cell(&self, row: usize, column: &str) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// All cells of one column in row order; absent cells read as `Null`.
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows
            .iter()
            .map(move |r| r.get(column).unwrap_or(&NULL))
    }

    /// Non-null values of `column` whose display text is `label`.
    pub fn values_labelled(&self, column: &str, label: &str) -> Vec<CellValue> {
        self.unique_values
            .get(column)
            .into_iter()
            .flatten()
            .filter(|v| !v.is_null() && v.to_string() == label)
            .cloned()
            .collect()
    }

    /// New dataset holding only the rows at `indices`, same column layout.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        let rows = indices
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        Dataset::new(self.column_names.clone(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, CellValue)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn new_keeps_header_order_and_appends_extra_columns() {
        let rows = vec![
            record(&[("b", CellValue::Integer(1)), ("a", "x".into())]),
            record(&[("z", CellValue::Null)]),
        ];
        let ds = Dataset::new(vec!["b".into(), "a".into()], rows);
        assert_eq!(ds.column_names, vec!["b", "a", "z"]);
        assert_eq!(ds.len(), 2);
        assert!(ds.has_column("z"));
        assert!(!ds.has_column("missing"));
    }

    #[test]
    fn absent_cells_read_as_null() {
        let ds = Dataset::from_records(vec![record(&[("a", CellValue::Integer(1))]), record(&[])]);
        let col: Vec<_> = ds.column("a").cloned().collect();
        assert_eq!(col, vec![CellValue::Integer(1), CellValue::Null]);
        assert!(ds.cell(5, "a").is_null());
    }

    #[test]
    fn select_builds_a_new_dataset() {
        let ds = Dataset::from_records(vec![
            record(&[("a", CellValue::Integer(1))]),
            record(&[("a", CellValue::Integer(2))]),
            record(&[("a", CellValue::Integer(3))]),
        ]);
        let picked = ds.select(&[0, 2]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.cell(1, "a"), &CellValue::Integer(3));
        assert_eq!(ds.len(), 3);
        assert!(!picked.unique_values["a"].contains(&CellValue::Integer(2)));
    }

    #[test]
    fn ordering_groups_by_kind() {
        let mut set = BTreeSet::new();
        set.insert(CellValue::from("b"));
        set.insert(CellValue::Float(1.5));
        set.insert(CellValue::Null);
        set.insert(CellValue::from("a"));
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(
            ordered,
            vec![
                CellValue::Null,
                CellValue::Float(1.5),
                CellValue::from("a"),
                CellValue::from("b"),
            ]
        );
    }

    #[test]
    fn nan_cells_are_equal_to_themselves() {
        let nan = CellValue::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(CellValue::Float(1.0), CellValue::Integer(1));

        let ds = Dataset::from_records(vec![record(&[("a", nan)])]);
        assert_eq!(ds, ds.clone());
    }

    #[test]
    fn values_labelled_matches_display_text() {
        let ds = Dataset::from_records(vec![
            record(&[("k", CellValue::Integer(1))]),
            record(&[("k", "1".into())]),
            record(&[("k", "2".into())]),
        ]);
        assert_eq!(
            ds.values_labelled("k", "1"),
            vec![CellValue::Integer(1), CellValue::from("1")]
        );
        assert!(ds.values_labelled("k", "3").is_empty());
        assert!(ds.values_labelled("missing", "1").is_empty());
    }

    #[test]
    fn null_displays_as_empty() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Integer(7).to_string(), "7");
    }
}
