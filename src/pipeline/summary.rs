use std::collections::BTreeSet;

use serde::Serialize;

use crate::data::model::Dataset;

use super::normalize::parse_numeric;

/// Aggregate figures over the filtered, normalized rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SummaryMetrics {
    /// Sum of the value column. Missing values are skipped, not counted as zero.
    pub total: f64,
    /// Number of rows, whether or not their value parsed.
    pub row_count: usize,
    /// Distinct non-missing values of the category column.
    pub distinct_count: usize,
}

impl SummaryMetrics {
    pub fn compute(dataset: &Dataset, value_column: &str, category_column: &str) -> Self {
        let total = if dataset.has_column(value_column) {
            dataset.column(value_column).filter_map(parse_numeric).sum()
        } else {
            0.0
        };

        let distinct_count = dataset
            .column(category_column)
            .filter(|v| !v.is_null())
            .collect::<BTreeSet<_>>()
            .len();

        SummaryMetrics {
            total,
            row_count: dataset.len(),
            distinct_count,
        }
    }
}
