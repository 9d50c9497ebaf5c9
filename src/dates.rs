use std::fmt::{self, Write};

use chrono::{
    NaiveDate, NaiveDateTime,
    format::{Item, StrftimeItems},
};

use crate::error::{ConfigError, MalformedInput};

/// Rejects patterns with specifiers chrono does not know.
pub fn check_pattern(pattern: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::DatePattern {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

/// Re-renders `value`, written with `in_pattern`, using `out_pattern`.
///
/// Patterns without a time component are parsed as a plain date.
pub fn format_date(
    value: &str,
    in_pattern: &str,
    out_pattern: &str,
) -> Result<String, MalformedInput> {
    let value = value.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, in_pattern) {
        return render(datetime.format(out_pattern), out_pattern);
    }

    let date = NaiveDate::parse_from_str(value, in_pattern).map_err(|_| MalformedInput::Date {
        value: value.to_string(),
        pattern: in_pattern.to_string(),
    })?;
    render(date.format(out_pattern), out_pattern)
}

fn render(formatted: impl fmt::Display, pattern: &str) -> Result<String, MalformedInput> {
    let mut out = String::new();
    write!(out, "{}", formatted).map_err(|_| MalformedInput::Pattern {
        pattern: pattern.to_string(),
    })?;
    Ok(out)
}
