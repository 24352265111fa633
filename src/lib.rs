//! Data preparation for small categorical dashboards.
//!
//! A loaded table goes through one pass per filter change: rows are filtered by
//! the selected categories, numeric columns are cleaned up, and the result is
//! turned into a formatted, coloured table, chart series and summary figures.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod state;

pub use color::{Color, ColorMap, TrendColors};
pub use config::PipelineConfig;
pub use data::filter::FilterSelection;
pub use data::model::{CellValue, Dataset, Record};
pub use pipeline::{Pipeline, PipelineOutput};
