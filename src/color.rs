use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Serialize, Serializer};

use crate::data::model::CellValue;
use crate::pipeline::normalize::parse_numeric;

// ---------------------------------------------------------------------------
// Color – an sRGB display colour rendered as `#rrggbb`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(Srgb<u8>);

impl Color {
    pub const GRAY: Color = Color::from_rgb(160, 160, 160);
    pub const GREEN: Color = Color::from_rgb(46, 204, 113);
    pub const RED: Color = Color::from_rgb(231, 76, 60);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(Srgb::new(r, g, b))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

impl FromStr for Color {
    type Err = palette::rgb::FromHexError;

    /// Parse `#rrggbb`, `rrggbb` or the short `#rgb` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Srgb::<u8>::from_str(s.trim()).map(Color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color
// ---------------------------------------------------------------------------

/// Maps values of the categorical column to display colours.
///
/// Keyed by the typed cell value, the same key the filter and the distinct
/// count use. Built once at startup and shared read-only by the table and the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Color>,
    fallback: Color,
}

impl ColorMap {
    /// A fixed mapping, usually read from configuration.
    pub fn new(mapping: BTreeMap<CellValue, Color>, fallback: Color) -> Self {
        ColorMap { mapping, fallback }
    }

    /// Assign evenly spaced hues to the distinct non-null values of a column.
    pub fn generated(unique_values: &BTreeSet<CellValue>, fallback: Color) -> Self {
        let values: Vec<&CellValue> = unique_values.iter().filter(|v| !v.is_null()).collect();
        let palette = generate_palette(values.len());
        let mapping = values.into_iter().cloned().zip(palette).collect();
        ColorMap { mapping, fallback }
    }

    /// Colour for a category value; unmapped and missing values get the fallback.
    pub fn category_color(&self, value: &CellValue) -> Color {
        if value.is_null() {
            return self.fallback;
        }
        self.mapping.get(value).copied().unwrap_or(self.fallback)
    }

    /// Legend entries (category label → colour) for a chart or table key.
    pub fn legend_entries(&self) -> Vec<(String, Color)> {
        self.mapping.iter().map(|(v, c)| (v.to_string(), *c)).collect()
    }
}

impl Serialize for ColorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr {
            categories: BTreeMap<String, Color>,
            fallback: Color,
        }
        Repr {
            categories: self.legend_entries().into_iter().collect(),
            fallback: self.fallback,
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Trend colours: sign of a numeric value → Color
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendColors {
    pub positive: Color,
    pub negative: Color,
    pub neutral: Color,
}

impl Default for TrendColors {
    fn default() -> Self {
        TrendColors {
            positive: Color::GREEN,
            negative: Color::RED,
            neutral: Color::GRAY,
        }
    }
}

impl TrendColors {
    /// Three-way colour by sign. Zero and unparseable values are neutral.
    pub fn trend_color(&self, value: &CellValue) -> Color {
        match parse_numeric(value) {
            Some(v) if v > 0.0 => self.positive,
            Some(v) if v < 0.0 => self.negative,
            _ => self.neutral,
        }
    }
}
