//! Error types for haggle

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for haggle
#[derive(Error, Debug)]
pub enum HaggleError {
    // Structural errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid negotiation state: {0}")]
    InvalidState(String),

    // Domain errors
    #[error("No viable product: {0}")]
    NoViableProduct(String),

    #[error("Budget shortfall: required {required}, available {available}")]
    BudgetShortfall { required: Decimal, available: Decimal },

    // Configuration errors
    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HaggleError {
    /// Domain failures the caller can recover from by choosing differently
    /// (another vendor, another offer). Everything else is a programming or
    /// input error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HaggleError::NoViableProduct(_) | HaggleError::BudgetShortfall { .. }
        )
    }
}

/// Result type alias for haggle operations
pub type Result<T> = std::result::Result<T, HaggleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_creation() {
        let err = HaggleError::NoViableProduct("Alice".to_string());
        assert_eq!(err.to_string(), "No viable product: Alice");
    }

    #[test]
    fn test_budget_shortfall_error() {
        let err = HaggleError::BudgetShortfall {
            required: dec!(120.50),
            available: dec!(99.99),
        };
        assert_eq!(
            err.to_string(),
            "Budget shortfall: required 120.50, available 99.99"
        );
    }

    #[test]
    fn test_error_conversion() {
        fn io_error_function() -> Result<()> {
            std::fs::read_to_string("/nonexistent/haggle.json")?;
            Ok(())
        }

        let result = io_error_function();
        assert!(matches!(result.unwrap_err(), HaggleError::Io(_)));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(HaggleError::NoViableProduct("x".to_string()).is_recoverable());
        assert!(HaggleError::BudgetShortfall {
            required: dec!(2),
            available: dec!(1),
        }
        .is_recoverable());
        assert!(!HaggleError::InvalidState("x".to_string()).is_recoverable());
        assert!(!HaggleError::InvalidArgument("x".to_string()).is_recoverable());
    }
}
