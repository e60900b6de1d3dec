//! serialization support for calculator output
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::payments::AmortizationResult;
use crate::payoff::PayoffDate;
use crate::portfolio::{LoanLine, LongestLoan, PortfolioSummary, PortfolioTotals};
use crate::types::LoanCategory;

/// one category board with its loans
#[derive(Debug, Serialize, Deserialize)]
pub struct BoardView {
    pub category: LoanCategory,
    pub key: String,
    pub loan_count: usize,
    pub monthly_payment: Money,
    pub loans: Vec<LoanLine>,
}

/// serializable view of a whole portfolio, grouped by board
#[derive(Debug, Serialize, Deserialize)]
pub struct PortfolioView {
    pub active_count: usize,
    pub totals: PortfolioTotals,
    pub longest: Option<LongestLoan>,
    pub payoff_date: PayoffDate,
    pub boards: Vec<BoardView>,
}

impl PortfolioView {
    pub fn from_summary(summary: &PortfolioSummary) -> Self {
        let boards = LoanCategory::ALL
            .iter()
            .map(|&category| {
                let loans: Vec<LoanLine> = summary
                    .lines
                    .iter()
                    .filter(|line| line.category == category)
                    .cloned()
                    .collect();
                let monthly_payment: Money = loans
                    .iter()
                    .filter(|line| line.is_active())
                    .map(|line| line.monthly_payment)
                    .sum();

                BoardView {
                    category,
                    key: category.key().to_string(),
                    loan_count: loans.len(),
                    monthly_payment,
                    loans,
                }
            })
            .collect();

        PortfolioView {
            active_count: summary.active_count,
            totals: summary.totals,
            longest: summary.longest.clone(),
            payoff_date: summary.payoff_date,
            boards,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// flat single-loan view
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultView {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub term_months: u32,
    pub payoff: String,
    pub approximate: bool,
}

impl ResultView {
    pub fn from_result(result: &AmortizationResult) -> Self {
        Self {
            monthly_payment: result.monthly_payment.round_dp(2),
            total_interest: result.total_interest.round_dp(2),
            total_payment: result.total_payment.round_dp(2),
            term_months: result.term_months,
            payoff: result.payoff_date.to_string(),
            approximate: result.approximate,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
