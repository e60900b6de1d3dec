pub mod config;
pub mod decimal;
pub mod errors;
pub mod input;
pub mod payments;
pub mod payoff;
pub mod portfolio;
pub mod serialization;
pub mod types;

// re-export key types
pub use config::{CalculatorConfig, LoanDefaults};
pub use decimal::{Money, Rate};
pub use errors::{CalculatorError, Result};
pub use input::{LoanInput, LoanInputBuilder, RawLoanFields};
pub use payments::{AmortizationCalculator, AmortizationResult, Calculation};
pub use payoff::{PayoffDate, PayoffDateProjector};
pub use portfolio::{LoanEntry, LoanLine, Portfolio, PortfolioSummary, PortfolioTotals};
pub use serialization::{PortfolioView, ResultView};
pub use types::{AmortizationPolicy, CalculationMode, LoanCategory, LoanId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
