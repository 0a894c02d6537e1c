use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::format::{FormatError, decode_emoji, format_utc_offset};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continent {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

/// A country as returned by the directory search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
    /// Empty for the few territories without one.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub capital: String,
    pub continent: Continent,
    /// Space-separated code point tokens, e.g. `"U+1F1EB U+1F1F7"`.
    #[serde(rename = "emojiU")]
    pub emoji_u: String,
    pub languages: Vec<Language>,
    pub currencies: Vec<String>,
}

impl Country {
    /// Flag emoji decoded from `emoji_u`.
    pub fn flag(&self) -> Result<String, FormatError> {
        decode_emoji(&self.emoji_u)
    }

    pub fn speaks(&self, language_code: &str) -> bool {
        self.languages.iter().any(|l| l.code == language_code)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: i64,
    pub description: String,
    /// Full image URL for the condition icon.
    pub icon: String,
}

/// Current weather at a country's capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    /// In whatever unit the provider reports (Kelvin unless told otherwise).
    pub temperature: f64,
    pub conditions: Vec<WeatherCondition>,
    /// Shift from UTC in seconds.
    pub timezone: i64,
}

impl WeatherInfo {
    pub fn timezone_label(&self) -> String {
        format_utc_offset(self.timezone)
    }

    /// Wall-clock time at the capital for the given instant.
    ///
    /// `None` when the provider reports an offset chrono cannot represent
    /// (a day or more).
    pub fn local_time(&self, now: DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
        let secs = i32::try_from(self.timezone).ok()?;
        let offset = FixedOffset::east_opt(secs)?;
        Some(now.with_timezone(&offset))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Builds a one-language country; the flag tokens are derived from `code`.
    fn country(
        name: &str,
        code: &str,
        capital: &str,
        continent: (&str, &str),
        lang: (&str, &str),
        currency: &str,
    ) -> Country {
        let emoji_u: Vec<String> =
            code.bytes().map(|b| format!("U+{:X}", 0x1F1E6 + u32::from(b - b'A'))).collect();

        Country {
            name: name.to_string(),
            code: code.to_string(),
            capital: capital.to_string(),
            continent: Continent { code: continent.0.to_string(), name: continent.1.to_string() },
            emoji_u: emoji_u.join(" "),
            languages: vec![Language { code: lang.0.to_string(), name: lang.1.to_string() }],
            currencies: vec![currency.to_string()],
        }
    }

    pub fn france() -> Country {
        country("France", "FR", "Paris", ("EU", "Europe"), ("FR", "French"), "EUR")
    }

    pub fn germany() -> Country {
        country("Germany", "DE", "Berlin", ("EU", "Europe"), ("DE", "German"), "EUR")
    }

    pub fn spain() -> Country {
        country("Spain", "ES", "Madrid", ("EU", "Europe"), ("ES", "Spanish"), "EUR")
    }

    pub fn japan() -> Country {
        country("Japan", "JP", "Tokyo", ("AS", "Asia"), ("JA", "Japanese"), "JPY")
    }

    pub fn four_countries() -> Vec<Country> {
        vec![france(), germany(), spain(), japan()]
    }
}
