//! Presentation pipeline: one synchronous pass per filter change.
//!
//! Architecture:
//! ```text
//!   source Dataset + FilterSelection
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  accepted categories → new Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  numeric columns → numbers / Null
//!   └───────────┘
//!        │
//!        ├──────────────┬──────────────┐
//!        ▼              ▼              ▼
//!   ┌─────────┐   ┌──────────┐   ┌──────────┐
//!   │ display  │   │  series   │   │ summary   │
//!   └─────────┘   └──────────┘   └──────────┘
//!   format+colour   chart data     KPI figures
//! ```

pub mod display;
pub mod format;
pub mod normalize;
pub mod series;
pub mod summary;

use serde::Serialize;

use crate::color::{ColorMap, TrendColors};
use crate::config::PipelineConfig;
use crate::data::filter::{FilterSelection, apply_filter};
use crate::data::model::Dataset;
use crate::error::ConfigError;

use display::{DisplayTable, build_table};
use series::{ChartSeries, build_series};
use summary::SummaryMetrics;

/// Everything the presentation layer needs for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// Filtered, normalized rows (numbers, not formatted strings).
    pub data: Dataset,
    pub table: DisplayTable,
    pub series: Vec<ChartSeries>,
    pub metrics: SummaryMetrics,
    /// The colour map shared by the table and the charts.
    pub color_map: ColorMap,
}

/// Immutable configuration for repeated runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    color_map: ColorMap,
    trend_colors: TrendColors,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, color_map: ColorMap, trend_colors: TrendColors) -> Self {
        Pipeline {
            config,
            color_map,
            trend_colors,
        }
    }

    /// Resolve colours from `config`, generating the colour map from `dataset`
    /// when none is configured.
    pub fn from_config(config: PipelineConfig, dataset: &Dataset) -> Result<Self, ConfigError> {
        let color_map = config.color_map(dataset)?;
        let trend_colors = config.trend_colors()?;
        Ok(Pipeline::new(config, color_map, trend_colors))
    }

    /// Filter → normalize → {table, series, metrics}. `dataset` is not modified.
    pub fn run(&self, dataset: &Dataset, selection: &FilterSelection) -> PipelineOutput {
        let filtered = apply_filter(dataset, selection);
        let data = normalize::normalize_columns(&filtered, &self.config.numeric_columns);

        let table = build_table(&data, &self.config, &self.color_map, &self.trend_colors);
        let series = build_series(&data, &self.config, &self.color_map);
        let metrics = SummaryMetrics::compute(
            &data,
            &self.config.value_column,
            &self.config.category_column,
        );

        log::info!(
            "pipeline run: {} of {} rows, {} series, total {}",
            metrics.row_count,
            dataset.len(),
            series.len(),
            metrics.total
        );

        PipelineOutput {
            data,
            table,
            series,
            metrics,
            color_map: self.color_map.clone(),
        }
    }
}
