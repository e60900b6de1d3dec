use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use tracing::{debug, warn};

use crate::decimal::{Money, Rate};
use crate::errors::{CalculatorError, Result};

/// totals from paying a fixed amount against a reducing balance
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRepayment {
    /// periods actually paid before the balance was retired
    pub periods: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    /// interest plus principal portion of the last period
    pub final_payment: Money,
    pub remaining_balance: Money,
}

/// outcome of the flat-rate fixed-point term search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRateTerm {
    pub term_months: u32,
    pub iterations: u32,
    pub converged: bool,
}

/// ceiling that ignores a fractional excess of at most `tolerance` periods
///
/// A ratio like 12.0000000004 comes from 8 dp rounding of a payment and
/// should resolve to 12 periods, not 13. Never returns less than 1.
pub fn ceil_with_tolerance(x: Decimal, tolerance: Decimal) -> Result<u32> {
    let floor = x.floor();
    let periods = if x - floor <= tolerance { floor } else { x.ceil() };
    let periods = periods.max(Decimal::ONE);

    periods.to_u32().ok_or_else(|| CalculatorError::overflow("term in months"))
}

/// closed-form term for a fixed payment on a reducing balance
///
/// n = ceil(-ln(1 - P*r/M) / ln(1 + r)). Requires `monthly_rate > 0` and
/// `payment > principal * monthly_rate`.
pub fn estimate_reducing_term(
    principal: Money,
    monthly_rate: Rate,
    payment: Money,
    tolerance: Decimal,
) -> Result<u32> {
    let r = monthly_rate.as_decimal();
    let coverage = principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|v| v.checked_div(payment.as_decimal()))
        .ok_or_else(|| CalculatorError::overflow("interest coverage"))?;

    let numerator = (Decimal::ONE - coverage)
        .checked_ln()
        .ok_or_else(|| CalculatorError::CalculationError {
            message: format!("payment {} does not amortize principal {}", payment, principal),
        })?;
    let denominator = (Decimal::ONE + r)
        .checked_ln()
        .filter(|d| *d > Decimal::ZERO)
        .ok_or_else(|| CalculatorError::CalculationError {
            message: format!("monthly rate {} is too small to solve for a term", monthly_rate),
        })?;

    let periods = (-numerator)
        .checked_div(denominator)
        .ok_or_else(|| CalculatorError::overflow("analytic term"))?;

    ceil_with_tolerance(periods, tolerance)
}

/// installments allowed past the analytic estimate to clear rounding residue
pub const SETTLEMENT_PERIODS: u32 = 2;

/// pay `payment` each period for at most `periods` periods
///
/// The last principal portion is capped at the remaining balance and the
/// loop stops as soon as the balance reaches zero.
pub fn simulate_reducing_balance(
    principal: Money,
    monthly_rate: Rate,
    payment: Money,
    periods: u32,
) -> Result<SimulatedRepayment> {
    let overflow = || CalculatorError::overflow("repayment simulation");
    let mut balance = principal;
    let mut total_paid = Money::ZERO;
    let mut total_interest = Money::ZERO;
    let mut final_payment = Money::ZERO;
    let mut paid_periods = 0;

    for i in 1..=periods {
        let interest = balance.checked_apply_rate(monthly_rate).ok_or_else(overflow)?;
        let principal_portion = (payment - interest).min(balance);
        balance -= principal_portion;

        total_paid = total_paid.checked_add(payment).ok_or_else(overflow)?;
        total_interest = total_interest.checked_add(interest).ok_or_else(overflow)?;
        final_payment = interest + principal_portion;
        paid_periods = i;

        if balance <= Money::ZERO {
            break;
        }
    }

    Ok(SimulatedRepayment {
        periods: paid_periods,
        total_paid,
        total_interest,
        final_payment,
        remaining_balance: balance.max(Money::ZERO),
    })
}

/// simulate from the analytic estimate until the balance is retired
///
/// The estimate may fall short when the payment sits just below a whole
/// number of periods; up to `SETTLEMENT_PERIODS` extra installments clear
/// what is left. Errors if a balance still remains after that.
pub fn settle_reducing_balance(
    principal: Money,
    monthly_rate: Rate,
    payment: Money,
    estimate: u32,
) -> Result<SimulatedRepayment> {
    let limit = estimate.saturating_add(SETTLEMENT_PERIODS);
    let repayment = simulate_reducing_balance(principal, monthly_rate, payment, limit)?;

    if repayment.remaining_balance.is_positive() {
        return Err(CalculatorError::CalculationError {
            message: format!(
                "payment {} leaves {} unpaid after {} periods",
                payment, repayment.remaining_balance, repayment.periods
            ),
        });
    }
    if repayment.periods > estimate {
        debug!(
            estimate,
            periods = repayment.periods,
            "extra installment retired the remaining balance"
        );
    }

    Ok(repayment)
}

/// simple interest over `term_months` on the original principal
pub fn flat_interest(principal: Money, annual_rate: Rate, term_months: u32) -> Result<Money> {
    let years = Decimal::from(term_months) / Decimal::from(12);
    principal
        .as_decimal()
        .checked_mul(annual_rate.as_decimal())
        .and_then(|v| v.checked_mul(years))
        .map(Money::from_decimal)
        .ok_or_else(|| CalculatorError::overflow("flat-rate interest"))
}

/// term for a fixed payment when interest is flat or zero
///
/// Starts from ceil(P/M) and repeats n <- ceil((P + I(n)) / M) until n is
/// stable or `max_iterations` is reached. A zero rate returns the start.
pub fn solve_flat_rate_term(
    principal: Money,
    annual_rate: Rate,
    payment: Money,
    max_iterations: u32,
    tolerance: Decimal,
) -> Result<FlatRateTerm> {
    let installments = |amount: Money| -> Result<Option<u32>> {
        let ratio = amount
            .as_decimal()
            .checked_div(payment.as_decimal())
            .ok_or_else(|| CalculatorError::overflow("installment count"))?;
        Ok(ceil_with_tolerance(ratio, tolerance).ok())
    };

    let mut n = installments(principal)?
        .ok_or_else(|| CalculatorError::overflow("installment count"))?;

    if annual_rate.is_zero() {
        return Ok(FlatRateTerm {
            term_months: n,
            iterations: 0,
            converged: true,
        });
    }

    for i in 1..=max_iterations {
        let interest = flat_interest(principal, annual_rate, n)?;
        let owed = principal
            .checked_add(interest)
            .ok_or_else(|| CalculatorError::overflow("flat-rate total"))?;
        let next = match installments(owed)? {
            Some(next) => next,
            None => {
                warn!(term_months = n, iteration = i, "flat-rate term estimate left u32 range");
                return Ok(FlatRateTerm {
                    term_months: n,
                    iterations: i,
                    converged: false,
                });
            }
        };

        if next == n {
            return Ok(FlatRateTerm {
                term_months: n,
                iterations: i,
                converged: true,
            });
        }
        n = next;
    }

    warn!(
        term_months = n,
        max_iterations,
        "flat-rate term did not converge, using last estimate"
    );
    Ok(FlatRateTerm {
        term_months: n,
        iterations: max_iterations,
        converged: false,
    })
}
