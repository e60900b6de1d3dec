use thiserror::Error;

use crate::decimal::Rate;
use crate::types::LoanId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl CalculatorError {
    pub(crate) fn overflow(step: &str) -> Self {
        CalculatorError::CalculationError {
            message: format!("decimal overflow while computing {}", step),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalculatorError>;
