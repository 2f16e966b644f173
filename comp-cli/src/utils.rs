use thiserror::Error;

/// Error returned when a string cannot be parsed as an amount.
#[derive(Debug, Error, PartialEq)]
#[error("invalid amount '{input}': {reason}")]
pub struct ParseAmountError {
    input: String,
    reason: String,
}

/// Normalizes amount input: trims whitespace, drops a leading `$` and
/// comma thousands separators.
fn normalize_amount_input(s: &str) -> String {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .replace(',', "")
}

/// Parses a dollar amount or week count such as `"1,134.43"` or `"$845"`.
pub fn parse_amount(s: &str) -> Result<f64, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    let value: f64 = normalized.parse().map_err(|e: std::num::ParseFloatError| {
        tracing::debug!(input = %s, "invalid amount: {}", e);
        ParseAmountError {
            input: s.to_string(),
            reason: e.to_string(),
        }
    })?;
    if !value.is_finite() {
        return Err(ParseAmountError {
            input: s.to_string(),
            reason: "not a finite number".to_string(),
        });
    }
    Ok(value)
}

/// Like [`parse_amount`], but blank input is `None`.
pub fn parse_optional_amount(s: &str) -> Result<Option<f64>, ParseAmountError> {
    if normalize_amount_input(s).is_empty() {
        Ok(None)
    } else {
        parse_amount(s).map(Some)
    }
}

/// Parses an annual rate given as a fraction (`0.0438`) or a percentage
/// with a trailing sign (`4.38%`).
pub fn parse_rate(s: &str) -> Result<f64, ParseAmountError> {
    match s.trim().strip_suffix('%') {
        Some(percent) => parse_amount(percent).map(|p| p / 100.0),
        None => parse_amount(s),
    }
}
