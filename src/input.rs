use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::LoanDefaults;
use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};
use crate::types::{AmortizationPolicy, CalculationMode};

/// numeric inputs for one loan calculation
///
/// `term_months` is only read in `ByTerm` mode and `fixed_payment` only in
/// `ByPayment` mode; the inactive field is carried along so switching modes
/// keeps what the user typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    pub annual_rate: Rate,
    pub mode: CalculationMode,
    pub term_months: u32,
    pub fixed_payment: Money,
    pub policy: AmortizationPolicy,
}

impl LoanInput {
    pub fn builder() -> LoanInputBuilder {
        LoanInputBuilder::new()
    }

    /// blank loan seeded from card defaults
    pub fn from_defaults(defaults: &LoanDefaults) -> Self {
        Self {
            principal: Money::ZERO,
            annual_rate: Rate::from_percent_decimal(defaults.annual_rate_percent),
            mode: defaults.mode,
            term_months: defaults.term_months.max(1),
            fixed_payment: Money::ZERO,
            policy: defaults.policy,
        }
    }

    /// annual rate as a percentage (15 for 15%)
    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate.as_percentage()
    }
}

impl Default for LoanInput {
    fn default() -> Self {
        Self::from_defaults(&LoanDefaults::default())
    }
}

/// builder for loan inputs
pub struct LoanInputBuilder {
    input: LoanInput,
}

impl LoanInputBuilder {
    pub fn new() -> Self {
        Self {
            input: LoanInput::default(),
        }
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.input.principal = principal;
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.input.annual_rate = rate;
        self
    }

    /// annual rate given as a percentage (e.g., 12.5 for 12.5%)
    pub fn rate_percent(mut self, percent: Decimal) -> Self {
        self.input.annual_rate = Rate::from_percent_decimal(percent);
        self
    }

    /// solve the payment for a fixed term
    pub fn term_months(mut self, months: u32) -> Self {
        self.input.mode = CalculationMode::ByTerm;
        self.input.term_months = months;
        self
    }

    /// solve the term for a fixed monthly payment
    pub fn fixed_payment(mut self, payment: Money) -> Self {
        self.input.mode = CalculationMode::ByPayment;
        self.input.fixed_payment = payment;
        self
    }

    pub fn mode(mut self, mode: CalculationMode) -> Self {
        self.input.mode = mode;
        self
    }

    pub fn policy(mut self, policy: AmortizationPolicy) -> Self {
        self.input.policy = policy;
        self
    }

    pub fn reducing_balance(self) -> Self {
        self.policy(AmortizationPolicy::ReducingBalance)
    }

    pub fn flat_rate(self) -> Self {
        self.policy(AmortizationPolicy::FlatRate)
    }

    pub fn build(self) -> Result<LoanInput> {
        if self.input.annual_rate.is_negative() {
            return Err(CalculatorError::InvalidInterestRate {
                rate: self.input.annual_rate,
            });
        }
        Ok(self.input)
    }
}

impl Default for LoanInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// loan card fields as typed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLoanFields {
    pub principal: String,
    pub rate: String,
    pub months: String,
    pub payment: String,
    pub reducing: bool,
    pub mode: CalculationMode,
}

impl RawLoanFields {
    pub fn from_defaults(defaults: &LoanDefaults) -> Self {
        Self {
            principal: String::new(),
            rate: defaults.annual_rate_percent.normalize().to_string(),
            months: defaults.term_months.to_string(),
            payment: String::new(),
            reducing: defaults.policy.is_reducing(),
            mode: defaults.mode,
        }
    }

    /// normalize text fields into engine input
    ///
    /// Unparseable or blank amounts become zero, negative rates are clamped
    /// to zero and the term is at least one month.
    pub fn normalize(&self) -> LoanInput {
        let rate = parse_leading_decimal(&self.rate).max(Decimal::ZERO);
        let months = parse_leading_integer(&self.months).unwrap_or(0).max(1);

        LoanInput {
            principal: Money::from_decimal(parse_leading_decimal(&self.principal)),
            annual_rate: Rate::from_percent_decimal(rate),
            mode: self.mode,
            term_months: u32::try_from(months).unwrap_or(u32::MAX),
            fixed_payment: Money::from_decimal(parse_leading_decimal(&self.payment)),
            policy: if self.reducing {
                AmortizationPolicy::ReducingBalance
            } else {
                AmortizationPolicy::FlatRate
            },
        }
    }
}

impl Default for RawLoanFields {
    fn default() -> Self {
        Self::from_defaults(&LoanDefaults::default())
    }
}

/// longest numeric prefix of `s` ("12.5abc" -> 12.5), zero if none
pub(crate) fn parse_leading_decimal(s: &str) -> Decimal {
    let s = s.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return Decimal::ZERO;
    }

    let prefix = s[..end].trim_end_matches('.');
    Decimal::from_str(prefix).unwrap_or(Decimal::ZERO)
}

/// leading integer of `s` ("12.9" -> 12), none if no digits
pub(crate) fn parse_leading_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '+' || c == '-'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    s[..end].parse::<i64>().ok()
}
