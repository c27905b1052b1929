//! Error types. None of these are fatal: callers log them and keep the
//! previous state.

use thiserror::Error;

/// A numeric control (range input) produced a value the simulator can't use.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{name}: not a number: {raw:?}")]
    NotANumber { name: &'static str, raw: String },

    #[error("{name}: non-finite value {value}")]
    NonFinite { name: &'static str, value: f64 },
}

/// The page-embedded JSON config could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A persisted preference value that doesn't decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized stored theme value: {0:?}")]
pub struct ThemeError(pub String);

/// Parse a control value, rejecting anything that would poison the stepper.
pub fn parse_param(name: &'static str, raw: &str) -> Result<f64, ParamError> {
    let value: f64 = raw.trim().parse().map_err(|_| ParamError::NotANumber {
        name,
        raw: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ParamError::NonFinite { name, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_numbers() {
        assert_eq!(parse_param("mass", " 0.5 "), Ok(0.5));
    }

    #[test]
    fn rejects_garbage_and_nan() {
        assert!(matches!(
            parse_param("mass", "abc"),
            Err(ParamError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_param("mass", ""),
            Err(ParamError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_param("amplitude", "NaN"),
            Err(ParamError::NonFinite { .. })
        ));
        assert!(matches!(
            parse_param("amplitude", "inf"),
            Err(ParamError::NonFinite { .. })
        ));
    }
}
