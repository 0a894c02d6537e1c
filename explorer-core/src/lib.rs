//! Core library for the `countries` explorer.
//!
//! This crate defines:
//! - Shared domain models (countries, reference data, weather)
//! - Client-side filtering and sorting of search results
//! - The capital weather adapter and the selection-driven weather state
//! - The country directory client and configuration handling
//!
//! It is used by `explorer-cli`, but can also back other front ends.

pub mod config;
pub mod controller;
pub mod directory;
pub mod filter;
pub mod format;
pub mod model;
pub mod weather;

pub use config::{Config, WeatherSettings};
pub use controller::{WEATHER_LOAD_ERROR, WeatherController, WeatherState};
pub use directory::{CountryDirectory, DirectoryError, GraphQlDirectory};
pub use filter::{FilterSpec, SortKey, SortOrder, SortSpec, apply};
pub use format::{FormatError, decode_emoji, format_utc_offset};
pub use model::{Continent, Country, Language, WeatherCondition, WeatherInfo};
pub use weather::{OpenWeatherClient, WeatherError, WeatherSource};
