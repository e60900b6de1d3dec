use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan entry
pub type LoanId = Uuid;

/// category board a loan is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanCategory {
    CreditCard,
    Mortgage,
    Auto,
    Personal,
    Education,
    Other,
}

impl LoanCategory {
    /// all boards in display order
    pub const ALL: [LoanCategory; 6] = [
        LoanCategory::CreditCard,
        LoanCategory::Mortgage,
        LoanCategory::Auto,
        LoanCategory::Personal,
        LoanCategory::Education,
        LoanCategory::Other,
    ];

    /// stable key used in serialized views
    pub fn key(&self) -> &'static str {
        match self {
            LoanCategory::CreditCard => "credit",
            LoanCategory::Mortgage => "home",
            LoanCategory::Auto => "car",
            LoanCategory::Personal => "personal",
            LoanCategory::Education => "education",
            LoanCategory::Other => "other",
        }
    }
}

/// which input is authoritative for a calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationMode {
    /// term in months is given, payment is solved
    ByTerm,
    /// fixed monthly payment is given, term is solved
    ByPayment,
}

/// interest accrual method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmortizationPolicy {
    /// interest on the outstanding balance each period
    ReducingBalance,
    /// simple interest on the original principal, prorated by term
    FlatRate,
}

impl AmortizationPolicy {
    pub fn is_reducing(&self) -> bool {
        matches!(self, AmortizationPolicy::ReducingBalance)
    }
}
