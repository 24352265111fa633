use std::collections::BTreeSet;

use serde::Serialize;

use super::loader::guess_cell_type;
use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Filter selection: which values of one categorical column are accepted
// ---------------------------------------------------------------------------

/// The set of accepted values for one categorical column.
///
/// An empty set means "no filter" (show all), never "show none".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub column: String,
    pub accepted: BTreeSet<CellValue>,
}

impl FilterSelection {
    /// A selection on `column` that accepts every row.
    pub fn all(column: &str) -> Self {
        FilterSelection {
            column: column.to_string(),
            accepted: BTreeSet::new(),
        }
    }

    /// A selection on `column` accepting exactly `values`.
    pub fn of<I, V>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        FilterSelection {
            column: column.to_string(),
            accepted: values.into_iter().map(Into::into).collect(),
        }
    }

    /// A selection on `column` from user-typed labels, such as `--filter` values.
    ///
    /// Each label accepts the values of `column` whose display text equals it, so
    /// `"2024"` matches a text cell and an integer cell alike. Labels matching no
    /// value are typed with [`guess_cell_type`] and kept.
    pub fn from_labels<S: AsRef<str>>(column: &str, labels: &[S], dataset: &Dataset) -> Self {
        let mut accepted = BTreeSet::new();
        for label in labels {
            let label = label.as_ref();
            let matching = dataset.values_labelled(column, label);
            if matching.is_empty() {
                log::warn!("filter value '{label}' does not occur in column '{column}'");
                accepted.insert(guess_cell_type(label));
            } else {
                accepted.extend(matching);
            }
        }
        FilterSelection {
            column: column.to_string(),
            accepted,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Add `value` if absent, remove it otherwise.
    pub fn toggle(&mut self, value: &CellValue) {
        if !self.accepted.remove(value) {
            self.accepted.insert(value.clone());
        }
    }

    /// Whether a cell passes this selection.
    ///
    /// * Empty selection → passes
    /// * Value in the selected set → passes
    /// * Missing value → passes only if `Null` was selected explicitly
    pub fn accepts(&self, value: &CellValue) -> bool {
        self.accepted.is_empty() || self.accepted.contains(value)
    }
}

/// Return indices of rows that pass the selection.
///
/// A selection on a column the dataset does not have is a no-op.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    if selection.is_empty() || !dataset.has_column(&selection.column) {
        if !selection.is_empty() {
            log::debug!(
                "filter column '{}' not present, passing {} rows through",
                selection.column,
                dataset.len()
            );
        }
        return (0..dataset.len()).collect();
    }

    dataset
        .column(&selection.column)
        .enumerate()
        .filter(|(_, val)| selection.accepts(val))
        .map(|(i, _)| i)
        .collect()
}

/// Build the filtered dataset. The source dataset is left untouched.
pub fn apply_filter(dataset: &Dataset, selection: &FilterSelection) -> Dataset {
    dataset.select(&filtered_indices(dataset, selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use proptest::prelude::*;

    fn dataset(categories: &[Option<&str>]) -> Dataset {
        let rows = categories
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut r = Record::new();
                r.insert("id".to_string(), CellValue::Integer(i as i64));
                if let Some(c) = c {
                    r.insert("Category".to_string(), CellValue::from(*c));
                }
                r
            })
            .collect();
        Dataset::new(vec!["id".into(), "Category".into()], rows)
    }

    #[test]
    fn empty_selection_shows_all() {
        let ds = dataset(&[Some("A"), None, Some("B")]);
        let out = apply_filter(&ds, &FilterSelection::all("Category"));
        assert_eq!(out, ds);
    }

    #[test]
    fn keeps_only_accepted_values() {
        let ds = dataset(&[Some("A"), Some("B"), Some("A"), Some("C")]);
        let sel = FilterSelection::of("Category", ["A", "C"]);
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 2, 3]);
    }

    #[test]
    fn missing_category_excluded_unless_null_selected() {
        let ds = dataset(&[Some("A"), None, Some("B")]);
        let mut sel = FilterSelection::of("Category", ["A"]);
        assert_eq!(filtered_indices(&ds, &sel), vec![0]);

        sel.toggle(&CellValue::Null);
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 1]);
    }

    #[test]
    fn unknown_column_is_a_no_op() {
        let ds = dataset(&[Some("A"), Some("B")]);
        let sel = FilterSelection::of("Theme", ["A"]);
        assert_eq!(apply_filter(&ds, &sel), ds);
    }

    #[test]
    fn selection_matching_nothing_gives_empty_dataset() {
        let ds = dataset(&[Some("A"), Some("B")]);
        let out = apply_filter(&ds, &FilterSelection::of("Category", ["Z"]));
        assert!(out.is_empty());
        assert_eq!(out.column_names, ds.column_names);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = FilterSelection::all("Category");
        sel.toggle(&CellValue::from("A"));
        assert!(sel.accepted.contains(&CellValue::from("A")));
        sel.toggle(&CellValue::from("A"));
        assert!(sel.is_empty());
    }

    #[test]
    fn labels_match_the_column_own_types() {
        let text_years = dataset(&[Some("2024"), Some("2023")]);
        let sel = FilterSelection::from_labels("Category", &["2024"], &text_years);
        assert_eq!(filtered_indices(&text_years, &sel), vec![0]);

        let int_years = Dataset::from_records(
            [2024, 2023]
                .iter()
                .map(|y| Record::from([("Category".to_string(), CellValue::Integer(*y))]))
                .collect(),
        );
        let sel = FilterSelection::from_labels("Category", &["2024"], &int_years);
        assert_eq!(filtered_indices(&int_years, &sel), vec![0]);

        let sel = FilterSelection::from_labels("Category", &["2025"], &text_years);
        assert!(sel.accepted.contains(&CellValue::Integer(2025)));
        assert!(filtered_indices(&text_years, &sel).is_empty());
    }

    #[test]
    fn empty_selection_keeps_nan_cells() {
        let mut ds = dataset(&[Some("A"), None]);
        ds.rows[0].insert("Score".to_string(), CellValue::Float(f64::NAN));
        let ds = Dataset::new(ds.column_names.clone(), ds.rows);
        assert_eq!(apply_filter(&ds, &FilterSelection::all("Category")), ds);
    }

    fn arb_categories() -> impl Strategy<Value = Vec<Option<String>>> {
        prop::collection::vec(
            prop::option::of(prop::sample::select(vec!["A", "B", "C", "D"]).prop_map(String::from)),
            0..60,
        )
    }

    proptest! {
        #[test]
        fn prop_empty_selection_is_identity(cats in arb_categories()) {
            let refs: Vec<Option<&str>> = cats.iter().map(|c| c.as_deref()).collect();
            let ds = dataset(&refs);
            prop_assert_eq!(apply_filter(&ds, &FilterSelection::all("Category")), ds);
        }

        #[test]
        fn prop_filter_is_sound_and_complete(
            cats in arb_categories(),
            picked in prop::collection::btree_set(prop::sample::select(vec!["A", "B", "C", "D"]), 1..4),
        ) {
            let refs: Vec<Option<&str>> = cats.iter().map(|c| c.as_deref()).collect();
            let ds = dataset(&refs);
            let sel = FilterSelection::of("Category", picked.iter().copied());
            let kept = filtered_indices(&ds, &sel);

            for &i in &kept {
                prop_assert!(sel.accepted.contains(ds.cell(i, "Category")));
            }
            let expected = (0..ds.len())
                .filter(|&i| sel.accepted.contains(ds.cell(i, "Category")))
                .count();
            prop_assert_eq!(kept.len(), expected);
        }
    }
}
