use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::data::filter::FilterSelection;
use crate::data::model::{CellValue, Dataset};
use crate::error::ConfigError;
use crate::pipeline::{Pipeline, PipelineOutput};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The full view state, independent of rendering.
///
/// Every change to the selection re-runs the whole pipeline against the
/// untouched source dataset.
pub struct DashboardState {
    pub config: PipelineConfig,

    /// Loaded dataset (None until one is set). Never modified.
    pub dataset: Option<Arc<Dataset>>,

    /// Pipeline built for the current dataset (colour map fixed at load).
    pub pipeline: Option<Pipeline>,

    /// Accepted values of the category column.
    pub selection: FilterSelection,

    /// Result of the latest run.
    pub output: Option<PipelineOutput>,
}

impl DashboardState {
    pub fn new(config: PipelineConfig) -> Self {
        let selection = FilterSelection::all(&config.category_column);
        Self {
            config,
            dataset: None,
            pipeline: None,
            selection,
            output: None,
        }
    }

    /// Ingest a newly loaded dataset, reset the filter and run the pipeline.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) -> Result<(), ConfigError> {
        self.pipeline = Some(Pipeline::from_config(self.config.clone(), &dataset)?);
        self.selection = FilterSelection::all(&self.config.category_column);
        self.dataset = Some(dataset);
        self.refresh();
        Ok(())
    }

    /// Re-run the pipeline for the current selection.
    pub fn refresh(&mut self) {
        if let (Some(ds), Some(pipeline)) = (&self.dataset, &self.pipeline) {
            self.output = Some(pipeline.run(ds, &self.selection));
        }
    }

    /// Category values the user can pick from.
    pub fn available_values(&self) -> BTreeSet<CellValue> {
        self.dataset
            .as_ref()
            .and_then(|ds| ds.unique_values.get(&self.config.category_column))
            .cloned()
            .unwrap_or_default()
    }

    /// Toggle a single category value in the selection.
    pub fn toggle_filter_value(&mut self, value: &CellValue) {
        self.selection.toggle(value);
        self.refresh();
    }

    /// Show only the given values.
    pub fn select_only<I, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.selection = FilterSelection::of(&self.config.category_column, values);
        self.refresh();
    }

    /// Show only the values whose display text is one of `labels`.
    pub fn select_labels<S: AsRef<str>>(&mut self, labels: &[S]) {
        let empty = Dataset::from_records(Vec::new());
        let dataset = self.dataset.as_deref().unwrap_or(&empty);
        self.selection =
            FilterSelection::from_labels(&self.config.category_column, labels, dataset);
        self.refresh();
    }

    /// Clear the selection, which shows every row.
    pub fn select_all(&mut self) {
        self.selection.accepted.clear();
        self.refresh();
    }

    /// Deselecting everything also clears the selection: an empty selection
    /// shows all rows, so there is no "show none" view.
    pub fn select_none(&mut self) {
        self.select_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn dataset() -> Arc<Dataset> {
        let rows = [("A", 1500), ("B", 2_300_000), ("A", 20)]
            .iter()
            .map(|(cat, vol)| {
                let mut r = Record::new();
                r.insert("Category".into(), (*cat).into());
                r.insert("Volume".into(), CellValue::Integer(*vol));
                r
            })
            .collect();
        Arc::new(Dataset::new(vec!["Category".into(), "Volume".into()], rows))
    }

    fn loaded() -> DashboardState {
        let mut state = DashboardState::new(PipelineConfig::default());
        state.set_dataset(dataset()).unwrap();
        state
    }

    fn row_count(state: &DashboardState) -> usize {
        state.output.as_ref().map_or(0, |o| o.metrics.row_count)
    }

    #[test]
    fn loading_shows_everything() {
        let state = loaded();
        assert_eq!(row_count(&state), 3);
        assert_eq!(state.available_values().len(), 2);
    }

    #[test]
    fn toggling_refilters() {
        let mut state = loaded();
        state.toggle_filter_value(&"A".into());
        assert_eq!(row_count(&state), 2);
        state.toggle_filter_value(&"B".into());
        assert_eq!(row_count(&state), 3);
        state.toggle_filter_value(&"A".into());
        assert_eq!(row_count(&state), 1);
    }

    #[test]
    fn select_labels_matches_integer_categories() {
        let rows = [2024, 2023, 2024]
            .iter()
            .map(|y| Record::from([("Category".to_string(), CellValue::Integer(*y))]))
            .collect();
        let mut state = DashboardState::new(PipelineConfig::default());
        state.set_dataset(Arc::new(Dataset::from_records(rows))).unwrap();

        state.select_labels(&["2024"]);
        assert_eq!(row_count(&state), 2);
        assert!(state.selection.accepted.contains(&CellValue::Integer(2024)));
        assert!(state.available_values().contains(&CellValue::Integer(2023)));
    }

    #[test]
    fn select_none_means_show_all() {
        let mut state = loaded();
        state.select_only(["B"]);
        assert_eq!(row_count(&state), 1);
        state.select_none();
        assert_eq!(row_count(&state), 3);
    }

    #[test]
    fn source_dataset_survives_runs() {
        let mut state = loaded();
        let before = state.dataset.clone().unwrap();
        state.select_only(["A"]);
        assert_eq!(state.dataset.as_deref(), Some(&*before));
        assert_eq!(before.len(), 3);
    }

    #[test]
    fn nothing_runs_without_a_dataset() {
        let mut state = DashboardState::new(PipelineConfig::default());
        state.toggle_filter_value(&"A".into());
        assert!(state.output.is_none());
    }
}
