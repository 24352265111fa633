use crate::data::model::{CellValue, Dataset};

/// Characters that spreadsheet exports sprinkle into numbers.
const NOISE: &[char] = &[',', '_', ' ', '\u{a0}', '$', '€', '£'];

/// Parse a cell as a number, tolerating human formatting.
///
/// `"1,234.5"`, `" $12 "`, `"-3.2%"` all parse; `"n/a"`, `""`, `NaN` do not.
pub fn parse_numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Integer(i) => Some(*i as f64),
        CellValue::Float(v) => v.is_finite().then_some(*v),
        CellValue::String(s) => {
            let trimmed = s.trim();
            let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
            let cleaned: String = trimmed.chars().filter(|c| !NOISE.contains(c)).collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        CellValue::Bool(_) | CellValue::Null => None,
    }
}

/// Typed cell for a parsed number: integral values stay integers.
fn numeric_cell(value: Option<f64>) -> CellValue {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => CellValue::Integer(v as i64),
        Some(v) => CellValue::Float(v),
        None => CellValue::Null,
    }
}

/// Coerce the designated columns to numbers in a new dataset.
///
/// Unparseable cells become `Null`; the row itself is kept. Columns the dataset
/// does not have are skipped.
pub fn normalize_columns<S: AsRef<str>>(dataset: &Dataset, columns: &[S]) -> Dataset {
    let present: Vec<&str> = columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|col| {
            let has = dataset.has_column(col);
            if !has {
                log::debug!("numeric column '{col}' not present, skipping");
            }
            has
        })
        .collect();

    let mut rejected = 0usize;
    let rows = dataset
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            for col in &present {
                if let Some(cell) = row.get_mut(*col) {
                    let parsed = parse_numeric(cell);
                    if parsed.is_none() && !cell.is_null() {
                        rejected += 1;
                    }
                    *cell = numeric_cell(parsed);
                }
            }
            row
        })
        .collect();

    if rejected > 0 {
        log::warn!("{rejected} cell(s) could not be parsed as numbers and were treated as missing");
    }

    Dataset::new(dataset.column_names.clone(), rows)
}
