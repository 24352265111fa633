use crate::data::model::CellValue;

const SUFFIXES: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Render a number for display.
///
/// * `|v| >= 1e9 / 1e6 / 1e3` → scaled, one decimal, `B` / `M` / `K` suffix
/// * integral → plain integer, no decimal point
/// * otherwise → two decimals
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    for (scale, suffix) in SUFFIXES {
        if value.abs() >= scale {
            return format!("{:.1}{suffix}", value / scale);
        }
    }
    if value.fract() == 0.0 {
        // `as` drops the sign of -0.0
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

/// Format a cell: numbers go through [`format_number`], everything else passes
/// through unchanged (missing values render empty).
pub fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Integer(i) => format_number(*i as f64),
        CellValue::Float(v) => format_number(*v),
        other => other.to_string(),
    }
}
