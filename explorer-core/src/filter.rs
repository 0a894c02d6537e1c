//! Client-side filtering and ordering of search results.

use std::{cmp::Ordering, convert::TryFrom};

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::model::Country;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Name,
    Continent,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Continent => "continent",
        }
    }

    pub const fn all() -> &'static [SortKey] {
        &[SortKey::Name, SortKey::Continent]
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SortKey {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "continent" => Ok(SortKey::Continent),
            _ => Err(anyhow::anyhow!(
                "Unknown sort key '{value}'. Supported keys: name, continent."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    /// Column header marker.
    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "▲",
            SortOrder::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Header-click behaviour: a new key starts ascending, the current key flips.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self { key, order: self.order.flipped() }
        } else {
            Self { key, order: SortOrder::Ascending }
        }
    }

    fn compare(&self, a: &Country, b: &Country) -> Ordering {
        let ord = match self.key {
            SortKey::Name => locale_cmp(&a.name, &b.name),
            SortKey::Continent => locale_cmp(&a.continent.name, &b.continent.name),
        };

        match self.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }
}

/// Continent/language restriction. `None` and `""` both mean "any".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    pub continent_code: Option<String>,
    pub language_code: Option<String>,
}

impl FilterSpec {
    pub fn new(continent_code: Option<String>, language_code: Option<String>) -> Self {
        Self { continent_code, language_code }
    }

    pub fn continent(&self) -> Option<&str> {
        self.continent_code.as_deref().filter(|c| !c.is_empty())
    }

    pub fn language(&self) -> Option<&str> {
        self.language_code.as_deref().filter(|c| !c.is_empty())
    }

    pub fn matches(&self, country: &Country) -> bool {
        if let Some(code) = self.continent() {
            if country.continent.code != code {
                return false;
            }
        }

        match self.language() {
            Some(code) => country.speaks(code),
            None => true,
        }
    }
}

/// Filter and order `countries` into a new vector. The input is left untouched.
///
/// The sort is stable; descending order negates the comparator rather than
/// reversing the result.
pub fn apply(countries: &[Country], filter: &FilterSpec, sort: &SortSpec) -> Vec<Country> {
    let mut result: Vec<Country> =
        countries.iter().filter(|c| filter.matches(c)).cloned().collect();

    result.sort_by(|a, b| sort.compare(a, b));
    result
}

/// Collation in three levels: base letters (accents and case ignored), then
/// accents (unaccented first), then case (lowercase first).
fn locale_cmp(a: &str, b: &str) -> Ordering {
    let base = |s: &str| -> String {
        s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
    };
    let lower = |s: &str| -> String { s.nfd().flat_map(char::to_lowercase).collect() };

    base(a).cmp(&base(b)).then_with(|| lower(a).cmp(&lower(b))).then_with(|| b.cmp(a))
}
