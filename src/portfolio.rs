use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::LoanDefaults;
use crate::decimal::Money;
use crate::errors::{CalculatorError, Result};
use crate::input::LoanInput;
use crate::payments::{AmortizationCalculator, Calculation};
use crate::payoff::{PayoffDate, PayoffDateProjector};
use crate::types::{LoanCategory, LoanId};

/// name shown for loans the user has not named
pub const UNNAMED_LOAN: &str = "New item";

/// one loan card on a category board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanEntry {
    pub id: LoanId,
    pub name: String,
    pub category: LoanCategory,
    pub input: LoanInput,
}

impl LoanEntry {
    pub fn new(category: LoanCategory, input: LoanInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            category,
            input,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            UNNAMED_LOAN
        } else {
            name
        }
    }
}

/// per-loan figures feeding the portfolio totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanLine {
    pub id: LoanId,
    pub name: String,
    pub category: LoanCategory,
    pub principal: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub term_months: u32,
    pub payoff_date: PayoffDate,
    /// interest-only payment when the fixed payment is too low
    pub min_required: Option<Money>,
}

impl LoanLine {
    fn from_outcome(entry: &LoanEntry, outcome: Option<Calculation>) -> Self {
        let mut line = Self {
            id: entry.id,
            name: entry.display_name().to_string(),
            category: entry.category,
            principal: Money::ZERO,
            monthly_payment: Money::ZERO,
            total_interest: Money::ZERO,
            total_payment: Money::ZERO,
            term_months: 0,
            payoff_date: PayoffDate::Undefined,
            min_required: None,
        };

        match outcome {
            Some(Calculation::Schedule(result)) => {
                line.principal = result.principal;
                line.monthly_payment = result.monthly_payment;
                line.total_interest = result.total_interest;
                line.total_payment = result.total_payment;
                line.term_months = result.term_months;
                line.payoff_date = result.payoff_date;
            }
            Some(Calculation::PaymentTooLow { min_required }) => {
                line.min_required = Some(min_required);
            }
            None => {}
        }

        line
    }

    pub fn is_active(&self) -> bool {
        self.monthly_payment.is_positive()
    }
}

/// sums over active loans
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub principal: Money,
}

impl PortfolioTotals {
    fn accumulate(self, line: &LoanLine) -> Result<Self> {
        let add = |total: Money, amount: Money| {
            total
                .checked_add(amount)
                .ok_or_else(|| CalculatorError::overflow("portfolio totals"))
        };
        Ok(Self {
            monthly_payment: add(self.monthly_payment, line.monthly_payment)?,
            total_interest: add(self.total_interest, line.total_interest)?,
            total_payment: add(self.total_payment, line.total_payment)?,
            principal: add(self.principal, line.principal)?,
        })
    }
}

/// the loan that is repaid last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongestLoan {
    pub id: LoanId,
    pub name: String,
    pub term_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub lines: Vec<LoanLine>,
    pub active_count: usize,
    pub totals: PortfolioTotals,
    pub longest: Option<LongestLoan>,
    /// month the last active loan is repaid
    pub payoff_date: PayoffDate,
}

impl PortfolioSummary {
    pub fn active_lines(&self) -> impl Iterator<Item = &LoanLine> {
        self.lines.iter().filter(|line| line.is_active())
    }

    /// aggregate already computed lines
    pub fn from_lines(lines: Vec<LoanLine>, reference: NaiveDate) -> Result<Self> {
        let mut totals = PortfolioTotals::default();
        let mut longest: Option<&LoanLine> = None;
        let mut active_count = 0;

        for line in lines.iter().filter(|line| line.is_active()) {
            active_count += 1;
            totals = totals.accumulate(line)?;

            // first loan wins ties
            if longest.map_or(true, |l| line.term_months > l.term_months) {
                longest = Some(line);
            }
        }

        let longest = longest.map(|line| LongestLoan {
            id: line.id,
            name: line.name.clone(),
            term_months: line.term_months,
        });
        let payoff_date = longest
            .as_ref()
            .map(|l| PayoffDateProjector::project_from(i64::from(l.term_months), reference))
            .unwrap_or(PayoffDate::Undefined);

        Ok(Self {
            lines,
            active_count,
            totals,
            longest,
            payoff_date,
        })
    }
}

/// loans across all category boards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    defaults: LoanDefaults,
    entries: Vec<LoanEntry>,
}

impl Portfolio {
    pub fn new(defaults: LoanDefaults) -> Self {
        Self {
            defaults,
            entries: Vec::new(),
        }
    }

    pub fn defaults(&self) -> &LoanDefaults {
        &self.defaults
    }

    /// add a blank loan to a board
    pub fn add_loan(&mut self, category: LoanCategory) -> LoanId {
        let entry = LoanEntry::new(category, LoanInput::from_defaults(&self.defaults));
        self.insert(entry)
    }

    pub fn insert(&mut self, entry: LoanEntry) -> LoanId {
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    pub fn remove(&mut self, id: LoanId) -> Result<LoanEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(CalculatorError::LoanNotFound { id })?;
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, id: LoanId) -> Option<&LoanEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: LoanId) -> Option<&mut LoanEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn update(&mut self, id: LoanId, input: LoanInput) -> Result<()> {
        let entry = self.get_mut(id).ok_or(CalculatorError::LoanNotFound { id })?;
        entry.input = input;
        Ok(())
    }

    pub fn rename(&mut self, id: LoanId, name: impl Into<String>) -> Result<()> {
        let entry = self.get_mut(id).ok_or(CalculatorError::LoanNotFound { id })?;
        entry.name = name.into();
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoanEntry> {
        self.entries.iter()
    }

    pub fn loans_in(&self, category: LoanCategory) -> impl Iterator<Item = &LoanEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn count_in(&self, category: LoanCategory) -> usize {
        self.loans_in(category).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// compute every loan and aggregate the active ones
    pub fn summarize(
        &self,
        calculator: &AmortizationCalculator,
        reference: NaiveDate,
    ) -> Result<PortfolioSummary> {
        let lines = self
            .entries
            .iter()
            .map(|entry| -> Result<LoanLine> {
                let outcome = calculator.compute_at(&entry.input, reference)?;
                Ok(LoanLine::from_outcome(entry, outcome))
            })
            .collect::<Result<Vec<_>>>()?;

        let summary = PortfolioSummary::from_lines(lines, reference)?;
        debug!(
            loans = self.entries.len(),
            active = summary.active_count,
            monthly_payment = %summary.totals.monthly_payment,
            "portfolio summarized"
        );
        Ok(summary)
    }

    pub fn summarize_now(
        &self,
        calculator: &AmortizationCalculator,
        time_provider: &SafeTimeProvider,
    ) -> Result<PortfolioSummary> {
        self.summarize(calculator, time_provider.now().date_naive())
    }
}
