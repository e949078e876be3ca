//! Maps a successful OpenWeather payload to display values: Celsius
//! temperature, condition text and a glyph category.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::model::WeatherResult;

pub const KELVIN_OFFSET: f64 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphCategory {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    VolcanicAsh,
    Squall,
    Tornado,
    Clear,
    Clouds,
    Unknown,
}

impl GlyphCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlyphCategory::Thunderstorm => "thunderstorm",
            GlyphCategory::Drizzle => "drizzle",
            GlyphCategory::Rain => "rain",
            GlyphCategory::Snow => "snow",
            GlyphCategory::Atmosphere => "atmosphere",
            GlyphCategory::VolcanicAsh => "volcanic ash",
            GlyphCategory::Squall => "squall",
            GlyphCategory::Tornado => "tornado",
            GlyphCategory::Clear => "clear",
            GlyphCategory::Clouds => "clouds",
            GlyphCategory::Unknown => "unknown",
        }
    }

    /// Emoji shown for the category. `Unknown` renders as nothing.
    pub fn emoji(&self) -> &'static str {
        match self {
            GlyphCategory::Thunderstorm => "\u{26C8}\u{FE0F}",
            GlyphCategory::Drizzle => "\u{1F326}\u{FE0F}",
            GlyphCategory::Rain => "\u{1F327}\u{FE0F}",
            GlyphCategory::Snow => "\u{2744}\u{FE0F}",
            GlyphCategory::Atmosphere => "\u{1F32B}\u{FE0F}",
            GlyphCategory::VolcanicAsh => "\u{1F30B}",
            GlyphCategory::Squall => "\u{1F4A8}",
            GlyphCategory::Tornado => "\u{1F32A}\u{FE0F}",
            GlyphCategory::Clear => "\u{2600}\u{FE0F}",
            GlyphCategory::Clouds => "\u{2601}\u{FE0F}",
            GlyphCategory::Unknown => "",
        }
    }
}

impl std::fmt::Display for GlyphCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checked top to bottom; the first range containing the code wins.
const CONDITION_RANGES: &[(RangeInclusive<i64>, GlyphCategory)] = &[
    (200..=232, GlyphCategory::Thunderstorm),
    (300..=321, GlyphCategory::Drizzle),
    (500..=531, GlyphCategory::Rain),
    (600..=622, GlyphCategory::Snow),
    (701..=761, GlyphCategory::Atmosphere),
    (762..=762, GlyphCategory::VolcanicAsh),
    (771..=771, GlyphCategory::Squall),
    (781..=781, GlyphCategory::Tornado),
    (800..=800, GlyphCategory::Clear),
    (801..=804, GlyphCategory::Clouds),
];

pub fn classify_code(code: i64) -> GlyphCategory {
    CONDITION_RANGES
        .iter()
        .find(|(range, _)| range.contains(&code))
        .map(|(_, category)| *category)
        .unwrap_or(GlyphCategory::Unknown)
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Rounds to whole degrees: 26.99 -> "27°C".
pub fn format_celsius(celsius: f64) -> String {
    format!("{celsius:.0}°C")
}

pub fn classify(temp_kelvin: f64, description: &str, code: i64) -> WeatherResult {
    let category = classify_code(code);
    tracing::debug!(code, %category, "classified weather condition");

    WeatherResult {
        temperature_c: kelvin_to_celsius(temp_kelvin),
        condition: description.to_string(),
        condition_code: code,
        category,
    }
}
