use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorMap, TrendColors};
use crate::data::loader::guess_cell_type;
use crate::data::model::Dataset;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Which columns play which role, plus the colour scheme.
///
/// Read from a JSON file; every field has a default so a partial file works:
///
/// ```json
/// {
///   "category_column": "Theme",
///   "colors": { "categories": { "DeFi": "#1f77b4", "Gaming": "#ff7f0e" } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column used for filtering, grouping and row colouring.
    pub category_column: String,
    /// Columns coerced to numbers and shown with K/M/B formatting.
    pub numeric_columns: Vec<String>,
    /// Signed column whose cell is coloured by sign.
    pub trend_column: String,
    /// Column summed into the total and plotted in the charts.
    pub value_column: String,
    /// Column naming each row in the charts.
    pub label_column: String,
    pub colors: ColorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            category_column: "Category".to_string(),
            numeric_columns: vec![
                "Volume".to_string(),
                "Rank".to_string(),
                "Change %".to_string(),
            ],
            trend_column: "Change %".to_string(),
            value_column: "Volume".to_string(),
            label_column: "Name".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

/// Colours as hex strings (`#rrggbb`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Category value → colour. Empty means "generate from the data".
    pub categories: BTreeMap<String, String>,
    pub fallback: String,
    pub positive: String,
    pub negative: String,
    pub neutral: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            categories: BTreeMap::new(),
            fallback: Color::GRAY.to_hex(),
            positive: Color::GREEN.to_hex(),
            negative: Color::RED.to_hex(),
            neutral: Color::GRAY.to_hex(),
        }
    }
}

fn parse_color(key: &str, value: &str) -> Result<Color, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidColor {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl PipelineConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// Check every colour parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trend_colors()?;
        self.fixed_categories()?;
        parse_color("fallback", &self.colors.fallback)?;
        Ok(())
    }

    pub fn trend_colors(&self) -> Result<TrendColors, ConfigError> {
        Ok(TrendColors {
            positive: parse_color("positive", &self.colors.positive)?,
            negative: parse_color("negative", &self.colors.negative)?,
            neutral: parse_color("neutral", &self.colors.neutral)?,
        })
    }

    fn fixed_categories(&self) -> Result<BTreeMap<String, Color>, ConfigError> {
        self.colors
            .categories
            .iter()
            .map(|(cat, hex)| Ok((cat.clone(), parse_color(cat, hex)?)))
            .collect()
    }

    /// Build the process-wide colour map.
    ///
    /// Uses the configured categories when there are any, otherwise assigns
    /// generated colours to the distinct categories of `dataset`. Configured
    /// labels resolve to the typed values of the category column they display as.
    pub fn color_map(&self, dataset: &Dataset) -> Result<ColorMap, ConfigError> {
        let fallback = parse_color("fallback", &self.colors.fallback)?;
        if !self.colors.categories.is_empty() {
            let mut mapping = BTreeMap::new();
            for (label, color) in self.fixed_categories()? {
                let values = dataset.values_labelled(&self.category_column, &label);
                if values.is_empty() {
                    mapping.insert(guess_cell_type(&label), color);
                } else {
                    mapping.extend(values.into_iter().map(|v| (v, color)));
                }
            }
            return Ok(ColorMap::new(mapping, fallback));
        }
        let map = match dataset.unique_values.get(&self.category_column) {
            Some(values) => ColorMap::generated(values, fallback),
            None => {
                log::debug!(
                    "category column '{}' not present, colour map is empty",
                    self.category_column
                );
                ColorMap::new(BTreeMap::new(), fallback)
            }
        };
        Ok(map)
    }
}
