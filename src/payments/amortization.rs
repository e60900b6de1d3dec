use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CalculatorConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};
use crate::input::LoanInput;
use crate::payments::term_solver::{
    estimate_reducing_term, flat_interest, settle_reducing_balance, solve_flat_rate_term,
};
use crate::payoff::{PayoffDate, PayoffDateProjector};
use crate::types::{AmortizationPolicy, CalculationMode};

/// summary of a computed repayment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub principal: Money,
    pub monthly_payment: Money,
    /// last installment; smaller than `monthly_payment` when a fixed payment overshoots
    pub final_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub term_months: u32,
    pub payoff_date: PayoffDate,
    pub mode: CalculationMode,
    pub policy: AmortizationPolicy,
    /// the flat-rate term search stopped at its iteration ceiling
    pub approximate: bool,
}

/// what a calculation produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Calculation {
    Schedule(AmortizationResult),
    /// the fixed payment does not cover a month of interest
    PaymentTooLow { min_required: Money },
}

impl Calculation {
    pub fn schedule(&self) -> Option<&AmortizationResult> {
        match self {
            Calculation::Schedule(result) => Some(result),
            Calculation::PaymentTooLow { .. } => None,
        }
    }

    pub fn into_schedule(self) -> Option<AmortizationResult> {
        match self {
            Calculation::Schedule(result) => Some(result),
            Calculation::PaymentTooLow { .. } => None,
        }
    }

    pub fn min_required(&self) -> Option<Money> {
        match self {
            Calculation::PaymentTooLow { min_required } => Some(*min_required),
            Calculation::Schedule(_) => None,
        }
    }

    /// one currency unit above the interest-only payment
    pub fn suggested_payment(&self) -> Option<Money> {
        self.min_required().and_then(|min| min.checked_add(Money::ONE))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Calculation::PaymentTooLow { .. })
    }
}

/// amortization calculator
///
/// Stateless apart from its configuration: every call recomputes from the
/// input, so results for identical inputs are identical.
#[derive(Debug, Clone, Default)]
pub struct AmortizationCalculator {
    config: CalculatorConfig,
}

impl AmortizationCalculator {
    pub fn new(config: CalculatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// compute using the provider's current date for the payoff projection
    pub fn compute(
        &self,
        input: &LoanInput,
        time_provider: &SafeTimeProvider,
    ) -> Result<Option<Calculation>> {
        self.compute_at(input, time_provider.now().date_naive())
    }

    /// compute with an explicit reference date
    ///
    /// Returns `Ok(None)` when there is nothing to compute (no principal, or
    /// no payment in `ByPayment` mode).
    pub fn compute_at(
        &self,
        input: &LoanInput,
        reference: NaiveDate,
    ) -> Result<Option<Calculation>> {
        if !input.principal.is_positive() {
            return Ok(None);
        }
        if input.annual_rate.is_negative() {
            return Err(CalculatorError::InvalidInterestRate {
                rate: input.annual_rate,
            });
        }

        let outcome = match input.mode {
            CalculationMode::ByTerm => Some(self.compute_by_term(input, reference)?),
            CalculationMode::ByPayment => self.compute_by_payment(input, reference)?,
        };

        debug!(
            principal = %input.principal,
            rate = %input.annual_rate,
            mode = ?input.mode,
            policy = ?input.policy,
            outcome = ?outcome.as_ref().map(|c| c.schedule().map(|r| r.term_months)),
            "loan computed"
        );

        Ok(outcome)
    }

    fn compute_by_term(&self, input: &LoanInput, reference: NaiveDate) -> Result<Calculation> {
        let principal = input.principal;
        let n = input.term_months.max(1);
        let periods = Decimal::from(n);
        let monthly_rate = input.annual_rate.monthly_rate();

        let (monthly_payment, total_interest) = match input.policy {
            AmortizationPolicy::ReducingBalance => {
                match calculate_emi_amount(principal, monthly_rate, n)? {
                    Some(emi) => {
                        let total = emi
                            .checked_mul(periods)
                            .ok_or_else(|| CalculatorError::overflow("total repayment"))?;
                        (emi, total - principal)
                    }
                    None => (principal / periods, Money::ZERO),
                }
            }
            AmortizationPolicy::FlatRate => {
                let interest = flat_interest(principal, input.annual_rate, n)?;
                let total = principal
                    .checked_add(interest)
                    .ok_or_else(|| CalculatorError::overflow("flat-rate total"))?;
                (total / periods, interest)
            }
        };
        let total_payment = monthly_payment
            .checked_mul(periods)
            .ok_or_else(|| CalculatorError::overflow("total repayment"))?;

        Ok(Calculation::Schedule(AmortizationResult {
            principal,
            monthly_payment,
            final_payment: monthly_payment,
            total_interest,
            total_payment,
            term_months: n,
            payoff_date: PayoffDateProjector::project_from(i64::from(n), reference),
            mode: CalculationMode::ByTerm,
            policy: input.policy,
            approximate: false,
        }))
    }

    fn compute_by_payment(
        &self,
        input: &LoanInput,
        reference: NaiveDate,
    ) -> Result<Option<Calculation>> {
        let principal = input.principal;
        let payment = input.fixed_payment;
        if !payment.is_positive() {
            return Ok(None);
        }

        let monthly_rate = input.annual_rate.monthly_rate();

        if input.policy.is_reducing() && !monthly_rate.is_zero() {
            let min_required = principal
                .checked_apply_rate(monthly_rate)
                .ok_or_else(|| CalculatorError::overflow("interest-only payment"))?;
            if payment <= min_required {
                debug!(%payment, %min_required, "fixed payment does not cover interest");
                return Ok(Some(Calculation::PaymentTooLow { min_required }));
            }

            // closed-form estimate first, then simulate to get exact totals
            let estimate =
                estimate_reducing_term(principal, monthly_rate, payment, self.config.tolerance)?;
            let repayment = settle_reducing_balance(principal, monthly_rate, payment, estimate)?;

            return Ok(Some(Calculation::Schedule(AmortizationResult {
                principal,
                monthly_payment: payment,
                final_payment: repayment.final_payment,
                total_interest: repayment.total_interest,
                total_payment: repayment.total_paid,
                term_months: repayment.periods,
                payoff_date: PayoffDateProjector::project_from(
                    i64::from(repayment.periods),
                    reference,
                ),
                mode: CalculationMode::ByPayment,
                policy: input.policy,
                approximate: false,
            })));
        }

        let term = solve_flat_rate_term(
            principal,
            input.annual_rate,
            payment,
            self.config.max_iterations,
            self.config.tolerance,
        )?;
        let n = term.term_months;
        let total_interest = flat_interest(principal, input.annual_rate, n)?;
        let total_payment = principal
            .checked_add(total_interest)
            .ok_or_else(|| CalculatorError::overflow("flat-rate total"))?;
        let earlier_installments = payment
            .checked_mul(Decimal::from(n.saturating_sub(1)))
            .ok_or_else(|| CalculatorError::overflow("installment total"))?;
        let final_payment = (total_payment - earlier_installments).max(Money::ZERO);

        Ok(Some(Calculation::Schedule(AmortizationResult {
            principal,
            monthly_payment: payment,
            final_payment,
            total_interest,
            total_payment,
            term_months: n,
            payoff_date: PayoffDateProjector::project_from(i64::from(n), reference),
            mode: CalculationMode::ByPayment,
            policy: input.policy,
            approximate: !term.converged,
        })))
    }
}

/// level installment for a reducing balance
///
/// EMI = P * r * (1 + r)^n / ((1 + r)^n - 1). Returns `None` when the rate is
/// zero or too small to register against 28 significant digits; callers
/// then split the principal evenly.
pub fn calculate_emi_amount(principal: Money, monthly_rate: Rate, months: u32) -> Result<Option<Money>> {
    let r = monthly_rate.as_decimal();
    if r.is_zero() {
        return Ok(None);
    }

    let compound = (Decimal::ONE + r)
        .checked_powu(u64::from(months.max(1)))
        .ok_or_else(|| CalculatorError::overflow("compound factor"))?;
    let denominator = compound - Decimal::ONE;
    if denominator <= Decimal::ZERO {
        return Ok(None);
    }

    let numerator = principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(|| CalculatorError::overflow("installment numerator"))?;

    numerator
        .checked_div(denominator)
        .map(|emi| Some(Money::from_decimal(emi)))
        .ok_or_else(|| CalculatorError::overflow("installment"))
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.000001);

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn policy_strategy() -> impl Strategy<Value = AmortizationPolicy> {
        prop_oneof![
            Just(AmortizationPolicy::ReducingBalance),
            Just(AmortizationPolicy::FlatRate),
        ]
    }

    /// principal 1k..10M, rate 0..30% in basis points, term up to 30 years
    fn by_term_strategy() -> impl Strategy<Value = LoanInput> {
        (1_000i64..10_000_000i64, 0i64..3_000i64, 1u32..=360u32, policy_strategy()).prop_map(
            |(principal, rate_bps, months, policy)| LoanInput {
                principal: Money::from_major(principal),
                annual_rate: Rate::from_percent_decimal(Decimal::new(rate_bps, 2)),
                mode: CalculationMode::ByTerm,
                term_months: months,
                fixed_payment: Money::ZERO,
                policy,
            },
        )
    }

    fn schedule(input: &LoanInput) -> AmortizationResult {
        AmortizationCalculator::default()
            .compute_at(input, reference())
            .unwrap()
            .and_then(Calculation::into_schedule)
            .unwrap()
    }

    /// fixed payments at, one cent under and one cent over the level installment
    fn by_payment_strategy() -> impl Strategy<Value = LoanInput> {
        (by_term_strategy(), -1i64..=1i64).prop_map(|(input, cents)| {
            let level = schedule(&input).monthly_payment.round_dp(2);
            LoanInput {
                mode: CalculationMode::ByPayment,
                fixed_payment: level + Money::CENT * Decimal::from(cents),
                ..input
            }
        })
    }

    proptest! {
        #[test]
        fn compute_is_pure(input in by_term_strategy()) {
            let calc = AmortizationCalculator::default();
            prop_assert_eq!(
                calc.compute_at(&input, reference()).unwrap(),
                calc.compute_at(&input, reference()).unwrap()
            );
        }

        #[test]
        fn by_term_conserves_totals(input in by_term_strategy()) {
            let result = schedule(&input);
            let n = Decimal::from(result.term_months);

            prop_assert!(result.total_payment.approx_eq(result.monthly_payment * n, TOL));
            prop_assert!((result.principal + result.total_interest).approx_eq(result.total_payment, TOL));
            prop_assert!(!result.total_interest.is_negative());
        }

        #[test]
        fn by_payment_conserves_totals(input in by_payment_strategy()) {
            let outcome = AmortizationCalculator::default()
                .compute_at(&input, reference())
                .unwrap()
                .unwrap();
            prop_assume!(!outcome.is_warning());
            let result = outcome.into_schedule().unwrap();
            prop_assume!(!result.approximate);

            let m = result.monthly_payment;
            let n = Decimal::from(result.term_months);
            prop_assert!(result.final_payment.is_positive());

            if input.policy.is_reducing() && !input.annual_rate.is_zero() {
                // every installment is charged, the last one only partly used
                prop_assert_eq!(result.total_payment, m * n);
                prop_assert!(result.final_payment <= m);
                prop_assert_eq!(
                    result.total_payment - result.principal - result.total_interest,
                    m - result.final_payment
                );
            } else {
                prop_assert_eq!(result.total_payment, result.principal + result.total_interest);
                let earlier = m * Decimal::from(result.term_months - 1);
                prop_assert_eq!(result.final_payment, result.total_payment - earlier);
                prop_assert!(result.final_payment <= m * (Decimal::ONE + TOL));
            }
        }

        #[test]
        fn zero_rate_splits_evenly(principal in 1i64..10_000_000i64, months in 1u32..=480u32) {
            let input = LoanInput {
                principal: Money::from_major(principal),
                annual_rate: Rate::ZERO,
                mode: CalculationMode::ByTerm,
                term_months: months,
                fixed_payment: Money::ZERO,
                policy: AmortizationPolicy::ReducingBalance,
            };
            let result = schedule(&input);

            prop_assert_eq!(result.monthly_payment, input.principal / Decimal::from(months));
            prop_assert_eq!(result.total_interest, Money::ZERO);
        }

        #[test]
        fn term_round_trips_through_payment(input in by_term_strategy()) {
            let by_term = schedule(&input);

            let mut by_payment_input = input.clone();
            by_payment_input.mode = CalculationMode::ByPayment;
            by_payment_input.fixed_payment = by_term.monthly_payment;
            let by_payment = schedule(&by_payment_input);

            prop_assert!(by_payment.term_months.abs_diff(by_term.term_months) <= 1);
            prop_assert!(!by_payment.approximate);
        }

        #[test]
        fn interest_only_payment_warns(principal in 1_000i64..1_000_000i64, rate_bps in 100i64..3_000i64) {
            let annual_rate = Rate::from_percent_decimal(Decimal::new(rate_bps, 2));
            let principal = Money::from_major(principal);
            let min_required = principal.apply_rate(annual_rate.monthly_rate());

            let input = LoanInput {
                principal,
                annual_rate,
                mode: CalculationMode::ByPayment,
                term_months: 1,
                fixed_payment: min_required,
                policy: AmortizationPolicy::ReducingBalance,
            };
            let calc = AmortizationCalculator::default();

            let at_minimum = calc.compute_at(&input, reference()).unwrap().unwrap();
            prop_assert_eq!(at_minimum.min_required(), Some(min_required));

            let above = LoanInput { fixed_payment: min_required + Money::CENT, ..input };
            let above_minimum = calc.compute_at(&above, reference()).unwrap().unwrap();
            prop_assert!(!above_minimum.is_warning());
        }
    }
}
