//! Display helpers for flag emoji and UTC offsets.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Invalid code point token '{token}'")]
    InvalidCodePoint { token: String },
}

/// Decode whitespace-separated code point tokens (`U+1F1FA U+1F1F8`) into a string.
///
/// The `U+` prefix is optional. A token that is not hex, or is not a Unicode
/// scalar value, fails the whole decode.
pub fn decode_emoji(tokens: &str) -> Result<String, FormatError> {
    tokens
        .split_whitespace()
        .map(|token| {
            let hex = token.strip_prefix("U+").unwrap_or(token);
            u32::from_str_radix(hex, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| FormatError::InvalidCodePoint { token: token.to_string() })
        })
        .collect()
}

/// Format an offset in seconds as `UTC +HH:MM` / `UTC -HH:MM`.
///
/// Seconds are rounded to the nearest minute first, so a rounded-up 60th
/// minute carries into the hour (3576s is `UTC +01:00`).
pub fn format_utc_offset(offset_seconds: i64) -> String {
    let sign = if offset_seconds >= 0 { '+' } else { '-' };
    let minutes = (offset_seconds.unsigned_abs() + 30) / 60;

    format!("UTC {sign}{:02}:{:02}", minutes / 60, minutes % 60)
}
