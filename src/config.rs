use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{CalculatorError, Result};
use crate::types::{AmortizationPolicy, CalculationMode};

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// ceiling for the flat-rate fixed-point term solver
    pub max_iterations: u32,
    /// fractional excess, in periods, that term rounding ignores
    pub tolerance: Decimal,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: dec!(0.000001),
        }
    }
}

impl CalculatorConfig {
    /// parse from json, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self> {
        let partial: PartialCalculatorConfig =
            serde_json::from_str(json).map_err(|e| CalculatorError::InvalidConfiguration {
                message: e.to_string(),
            })?;

        let defaults = Self::default();
        let config = Self {
            max_iterations: partial.max_iterations.unwrap_or(defaults.max_iterations),
            tolerance: partial.tolerance.unwrap_or(defaults.tolerance),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(CalculatorError::InvalidConfiguration {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        if self.tolerance < Decimal::ZERO || self.tolerance >= Decimal::ONE {
            return Err(CalculatorError::InvalidConfiguration {
                message: format!("tolerance must be in [0, 1), got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct PartialCalculatorConfig {
    max_iterations: Option<u32>,
    tolerance: Option<Decimal>,
}

/// values a fresh loan card starts with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDefaults {
    pub annual_rate_percent: Decimal,
    pub term_months: u32,
    pub mode: CalculationMode,
    pub policy: AmortizationPolicy,
}

impl Default for LoanDefaults {
    fn default() -> Self {
        Self {
            annual_rate_percent: dec!(15),
            term_months: 12,
            mode: CalculationMode::ByTerm,
            policy: AmortizationPolicy::ReducingBalance,
        }
    }
}

impl LoanDefaults {
    pub fn from_json(json: &str) -> Result<Self> {
        let defaults: Self =
            serde_json::from_str(json).map_err(|e| CalculatorError::InvalidConfiguration {
                message: e.to_string(),
            })?;

        if defaults.term_months == 0 {
            return Err(CalculatorError::InvalidConfiguration {
                message: "default term must be at least 1 month".to_string(),
            });
        }
        if defaults.annual_rate_percent < Decimal::ZERO {
            return Err(CalculatorError::InvalidConfiguration {
                message: format!(
                    "default rate must not be negative, got {}",
                    defaults.annual_rate_percent
                ),
            });
        }
        Ok(defaults)
    }
}
