//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while parsing or converting physical quantities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// The input string was empty.
    #[error("Empty value")]
    Empty,

    /// The numeric part could not be parsed.
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    /// The unit suffix is not recognised.
    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    /// The value must be strictly positive and finite.
    #[error("Value must be positive, got {0}")]
    NotPositive(f64),
}

/// Result type alias for unit parsing.
pub type UnitResult<T> = Result<T, UnitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_error_display() {
        assert_eq!(UnitError::Empty.to_string(), "Empty value");
        assert_eq!(
            UnitError::UnknownUnit("furlong".to_string()).to_string(),
            "Unknown unit 'furlong'"
        );
        assert_eq!(
            UnitError::NotPositive(-2.5).to_string(),
            "Value must be positive, got -2.5"
        );
    }
}
