use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::{GlyphCategory, format_celsius};

/// A single lookup request. The city is passed through exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub temperature_c: f64,
    pub condition: String,
    pub condition_code: i64,
    pub category: GlyphCategory,
}

impl WeatherResult {
    /// Temperature rounded for display, e.g. "27°C".
    pub fn temperature_label(&self) -> String {
        format_celsius(self.temperature_c)
    }

    pub fn glyph(&self) -> &'static str {
        self.category.emoji()
    }
}

/// User-facing failure: a headline and a detail line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub headline: String,
    pub detail: String,
}

impl ErrorResult {
    pub fn new(headline: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            detail: detail.into(),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.headline, self.detail)
    }
}

/// Exactly one of these is produced per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Weather(WeatherResult),
    Error(ErrorResult),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }
}
