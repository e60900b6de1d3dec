pub mod amortization;
pub mod term_solver;

pub use amortization::{calculate_emi_amount, AmortizationCalculator, AmortizationResult, Calculation};
pub use term_solver::{FlatRateTerm, SimulatedRepayment};
