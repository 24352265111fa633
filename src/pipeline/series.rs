use std::collections::BTreeMap;

use serde::Serialize;

use crate::color::{Color, ColorMap};
use crate::config::PipelineConfig;
use crate::data::model::{CellValue, Dataset};

use super::normalize::parse_numeric;

// ---------------------------------------------------------------------------
// Chart-ready series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// All plotted values of one category, in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Category label; empty for rows without a category.
    pub category: String,
    /// Same colour the table uses for this category.
    pub color: Color,
    pub points: Vec<SeriesPoint>,
    /// Sum of `points`, for pie slices and category bars.
    pub total: f64,
}

/// Group the value column by category, one series per category in sorted order.
///
/// Values stay numeric (never the formatted strings). Unparseable values are left
/// out; a category whose values are all missing still gets an empty series. No
/// value column means no series. No category column puts every row in one series.
pub fn build_series(
    dataset: &Dataset,
    config: &PipelineConfig,
    color_map: &ColorMap,
) -> Vec<ChartSeries> {
    if !dataset.has_column(&config.value_column) {
        log::debug!(
            "value column '{}' not present, no chart series",
            config.value_column
        );
        return Vec::new();
    }

    let mut groups: BTreeMap<&CellValue, Vec<SeriesPoint>> = BTreeMap::new();
    for idx in 0..dataset.len() {
        let category = dataset.cell(idx, &config.category_column);
        let points = groups.entry(category).or_default();

        let Some(value) = parse_numeric(dataset.cell(idx, &config.value_column)) else {
            continue;
        };

        let label = match dataset.cell(idx, &config.label_column) {
            CellValue::Null => format!("row {idx}"),
            other => other.to_string(),
        };
        points.push(SeriesPoint { label, value });
    }

    groups
        .into_iter()
        .map(|(category, points)| ChartSeries {
            category: category.to_string(),
            color: color_map.category_color(category),
            total: points.iter().map(|p| p.value).sum(),
            points,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn row(name: Option<&str>, cat: Option<&str>, vol: CellValue) -> Record {
        let mut r = Record::new();
        if let Some(name) = name {
            r.insert("Name".into(), name.into());
        }
        if let Some(cat) = cat {
            r.insert("Category".into(), cat.into());
        }
        r.insert("Volume".into(), vol);
        r
    }

    fn colors() -> ColorMap {
        let mut m = BTreeMap::new();
        m.insert("A".into(), Color::from_rgb(10, 20, 30));
        ColorMap::new(m, Color::GRAY)
    }

    #[test]
    fn groups_values_by_category() {
        let ds = Dataset::from_records(vec![
            row(Some("x"), Some("B"), CellValue::Integer(5)),
            row(Some("y"), Some("A"), CellValue::Integer(1500)),
            row(None, Some("A"), CellValue::Float(2.5)),
            row(Some("z"), Some("A"), CellValue::Null),
        ]);
        let series = build_series(&ds, &PipelineConfig::default(), &colors());

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].category, "A");
        assert_eq!(series[0].color, Color::from_rgb(10, 20, 30));
        assert_eq!(series[0].total, 1502.5);
        assert_eq!(
            series[0].points,
            vec![
                SeriesPoint { label: "y".into(), value: 1500.0 },
                SeriesPoint { label: "row 2".into(), value: 2.5 },
            ]
        );
        assert_eq!(series[1].category, "B");
        assert_eq!(series[1].color, Color::GRAY);
    }

    #[test]
    fn rows_without_category_share_the_fallback_series() {
        let ds = Dataset::from_records(vec![
            row(Some("x"), None, CellValue::Integer(1)),
            row(Some("y"), Some("A"), CellValue::Integer(2)),
        ]);
        let series = build_series(&ds, &PipelineConfig::default(), &colors());
        assert_eq!(series[0].category, "");
        assert_eq!(series[0].color, Color::GRAY);
        assert_eq!(series[0].total, 1.0);
    }

    #[test]
    fn no_value_column_no_series() {
        let config = PipelineConfig {
            value_column: "TVL".into(),
            ..PipelineConfig::default()
        };
        let ds = Dataset::from_records(vec![row(Some("x"), Some("A"), CellValue::Integer(1))]);
        assert!(build_series(&ds, &config, &colors()).is_empty());
    }
}
