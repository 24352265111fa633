use serde::Serialize;

use crate::color::{Color, ColorMap, TrendColors};
use crate::config::PipelineConfig;
use crate::data::model::Dataset;

use super::format::format_cell;

// ---------------------------------------------------------------------------
// Display-ready table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayCell {
    pub text: String,
    /// Cell-level colour (trend and category cells).
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    /// Category colour of the row; `None` when there is no category column.
    pub row_color: Option<Color>,
    /// One cell per entry of [`DisplayTable::columns`].
    pub cells: Vec<DisplayCell>,
}

/// Formatted strings plus colour annotations, ready for a table widget.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<DisplayRow>,
}

impl DisplayTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the table from normalized rows. Values are only formatted; colours are
/// annotations beside them.
pub fn build_table(
    dataset: &Dataset,
    config: &PipelineConfig,
    color_map: &ColorMap,
    trend_colors: &TrendColors,
) -> DisplayTable {
    let has_category = dataset.has_column(&config.category_column);
    let has_trend = dataset.has_column(&config.trend_column);

    let rows = (0..dataset.len())
        .map(|i| {
            let category = dataset.cell(i, &config.category_column);
            let row_color = has_category.then(|| color_map.category_color(category));

            let cells = dataset
                .column_names
                .iter()
                .map(|col| {
                    let value = dataset.cell(i, col);
                    let text = if config.numeric_columns.contains(col) {
                        format_cell(value)
                    } else {
                        value.to_string()
                    };
                    let color = if has_trend && *col == config.trend_column {
                        Some(trend_colors.trend_color(value))
                    } else if *col == config.category_column {
                        row_color
                    } else {
                        None
                    };
                    DisplayCell { text, color }
                })
                .collect();

            DisplayRow { row_color, cells }
        })
        .collect();

    DisplayTable {
        columns: dataset.column_names.clone(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Record};
    use std::collections::BTreeMap;

    fn sample() -> Dataset {
        let rows = vec![
            [
                ("Name", CellValue::from("Alpha")),
                ("Category", CellValue::from("DeFi")),
                ("Volume", CellValue::Integer(2_300_000)),
                ("Change %", CellValue::Float(4.2)),
            ],
            [
                ("Name", CellValue::from("Beta")),
                ("Category", CellValue::from("Meme")),
                ("Volume", CellValue::Null),
                ("Change %", CellValue::Float(-1.0)),
            ],
        ]
        .into_iter()
        .map(|pairs| {
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<Record>()
        })
        .collect();
        Dataset::new(
            vec!["Name".into(), "Category".into(), "Volume".into(), "Change %".into()],
            rows,
        )
    }

    fn colors() -> ColorMap {
        let mut m = BTreeMap::new();
        m.insert("DeFi".into(), Color::from_rgb(1, 2, 3));
        ColorMap::new(m, Color::GRAY)
    }

    #[test]
    fn formats_numbers_and_annotates_colours() {
        let config = PipelineConfig::default();
        let trend = TrendColors::default();
        let table = build_table(&sample(), &config, &colors(), &trend);

        assert_eq!(table.columns, vec!["Name", "Category", "Volume", "Change %"]);
        let first = &table.rows[0];
        assert_eq!(first.row_color, Some(Color::from_rgb(1, 2, 3)));
        assert_eq!(first.cells[2].text, "2.3M");
        assert_eq!(first.cells[3].text, "4.20");
        assert_eq!(first.cells[3].color, Some(trend.positive));
        assert_eq!(first.cells[1].color, first.row_color);
        assert_eq!(first.cells[0].color, None);

        let second = &table.rows[1];
        assert_eq!(second.row_color, Some(Color::GRAY));
        assert_eq!(second.cells[2].text, "");
        assert_eq!(second.cells[3].color, Some(trend.negative));
    }

    #[test]
    fn absent_columns_leave_rows_uncoloured() {
        let config = PipelineConfig {
            category_column: "Theme".into(),
            trend_column: "Delta".into(),
            ..PipelineConfig::default()
        };
        let table = build_table(&sample(), &config, &colors(), &TrendColors::default());
        assert!(table.rows.iter().all(|r| r.row_color.is_none()));
        assert!(table.rows[0].cells.iter().all(|c| c.color.is_none()));
    }

    #[test]
    fn empty_dataset_gives_empty_table() {
        let ds = Dataset::new(vec!["Name".into()], Vec::new());
        let table = build_table(
            &ds,
            &PipelineConfig::default(),
            &colors(),
            &TrendColors::default(),
        );
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["Name"]);
    }
}
