use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lab, Mix, Srgb};

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Dashboard theme
// ---------------------------------------------------------------------------

pub const NEON_YELLOW: Color32 = Color32::from_rgb(0xf3, 0xff, 0x8c);
pub const ORANGE: Color32 = Color32::from_rgb(0xe7, 0x6d, 0x00);
pub const FOREST: Color32 = Color32::from_rgb(0x2d, 0x64, 0x2b);
pub const MINT: Color32 = Color32::from_rgb(0xd4, 0xff, 0xcb);
pub const PINK: Color32 = Color32::from_rgb(0xff, 0x2d, 0x95);
pub const CYAN: Color32 = Color32::from_rgb(0x00, 0xf7, 0xff);
pub const PURPLE: Color32 = Color32::from_rgb(0x8c, 0x5a, 0xe8);
pub const TITLE_GREEN: Color32 = Color32::from_rgb(0x00, 0xff, 0xb3);

/// Fixed colours for the gender column.
pub const GENDER_COLORS: &[(&str, Color32)] = &[("F", NEON_YELLOW), ("M", ORANGE)];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

fn from_color32(c: Color32) -> Srgb {
    Srgb::<u8>::new(c.r(), c.g(), c.b()).into_format()
}

// ---------------------------------------------------------------------------
// Diverging scale for correlations
// ---------------------------------------------------------------------------

const COOL: Color32 = Color32::from_rgb(59, 76, 192);
const NEUTRAL: Color32 = Color32::from_rgb(221, 221, 221);
const WARM: Color32 = Color32::from_rgb(180, 4, 38);

/// Blue → grey → red colour for a value in `[-1, 1]`, mixed in Lab space.
/// Undefined values are drawn dark grey.
pub fn diverging_color(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::DARK_GRAY;
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    let (end, factor) = if t < 0.0 { (COOL, -t) } else { (WARM, t) };
    let neutral: Lab = from_color32(NEUTRAL).into_color();
    let end: Lab = from_color32(end).into_color();
    let rgb: Srgb = neutral.mix(end, factor).into_color();
    to_color32(rgb)
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_on(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a categorical column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from a column's unique values.
    pub fn new(unique_values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping = unique_values.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Like [`ColorMap::new`], with fixed colours for the listed values.
    pub fn with_fixed(unique_values: &BTreeSet<CellValue>, fixed: &[(&str, Color32)]) -> Self {
        let mut map = Self::new(unique_values);
        for (value, color) in fixed {
            let key = CellValue::from(*value);
            if let Some(slot) = map.mapping.get_mut(&key) {
                *slot = *color;
            }
        }
        map
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}
