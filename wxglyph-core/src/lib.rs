//! Core library for the `wxglyph` CLI.
//!
//! This crate defines:
//! - Configuration & credential lookup
//! - The OpenWeather request dispatcher and its error classification
//! - Weather-code to glyph classification
//! - Display state shared by front ends
//!
//! It is used by `wxglyph-cli`, but can also be reused by other binaries or services.

pub mod classifier;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod provider;

pub use classifier::{GlyphCategory, classify_code, format_celsius, kelvin_to_celsius};
pub use config::Config;
pub use display::WeatherDisplay;
pub use error::FetchError;
pub use model::{ErrorResult, Outcome, WeatherQuery, WeatherResult};
pub use provider::{WeatherProvider, lookup, openweather::OpenWeatherProvider, provider_from_config};
