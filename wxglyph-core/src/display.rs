//! The three display slots a lookup writes to. Every outcome overwrites
//! all of them, so nothing from an earlier query survives.

use crate::model::{ErrorResult, Outcome, WeatherResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherDisplay {
    /// Temperature on success, the error message otherwise.
    pub headline: String,
    pub glyph: String,
    pub condition: String,
}

impl WeatherDisplay {
    pub fn apply(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Weather(result) => self.show_weather(result),
            Outcome::Error(err) => self.show_error(err),
        }
    }

    pub fn show_weather(&mut self, result: &WeatherResult) {
        self.headline = result.temperature_label();
        self.glyph = result.glyph().to_string();
        self.condition = result.condition.clone();
    }

    pub fn show_error(&mut self, err: &ErrorResult) {
        self.headline = err.message();
        self.glyph.clear();
        self.condition.clear();
    }

    /// Non-empty slots, top to bottom.
    pub fn lines(&self) -> Vec<&str> {
        [&self.headline, &self.glyph, &self.condition]
            .into_iter()
            .map(String::as_str)
            .filter(|line| !line.is_empty())
            .collect()
    }
}
