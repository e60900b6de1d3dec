use chrono::{Datelike, Months, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use std::fmt;

/// calendar month in which a loan is fully repaid
///
/// Only the Gregorian month and year are exposed; era conversion and month
/// names belong to whoever renders the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoffDate {
    Scheduled { month: u32, year: i32 },
    Undefined,
}

impl PayoffDate {
    pub fn is_defined(&self) -> bool {
        matches!(self, PayoffDate::Scheduled { .. })
    }

    /// (month 1-12, gregorian year)
    pub fn month_year(&self) -> Option<(u32, i32)> {
        match *self {
            PayoffDate::Scheduled { month, year } => Some((month, year)),
            PayoffDate::Undefined => None,
        }
    }
}

impl fmt::Display for PayoffDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoffDate::Scheduled { month, year } => write!(f, "{:02}/{}", month, year),
            PayoffDate::Undefined => write!(f, "-"),
        }
    }
}

/// projects a term in months onto the calendar
pub struct PayoffDateProjector;

impl PayoffDateProjector {
    /// project from the provider's current date
    pub fn project(term_months: i64, time_provider: &SafeTimeProvider) -> PayoffDate {
        Self::project_from(term_months, time_provider.now().date_naive())
    }

    /// project from an explicit reference date
    pub fn project_from(term_months: i64, reference: NaiveDate) -> PayoffDate {
        if term_months <= 0 {
            return PayoffDate::Undefined;
        }
        let Ok(months) = u32::try_from(term_months) else {
            return PayoffDate::Undefined;
        };

        // day of month is irrelevant, anchor on the 1st so month-end never clamps
        let anchor = reference.with_day(1).unwrap_or(reference);
        match anchor.checked_add_months(Months::new(months)) {
            Some(date) => PayoffDate::Scheduled {
                month: date.month(),
                year: date.year(),
            },
            None => PayoffDate::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_project_within_year() {
        let payoff = PayoffDateProjector::project_from(3, date(2024, 1, 15));
        assert_eq!(payoff, PayoffDate::Scheduled { month: 4, year: 2024 });
    }

    #[test]
    fn test_project_rolls_over_year() {
        let payoff = PayoffDateProjector::project_from(12, date(2024, 11, 30));
        assert_eq!(payoff, PayoffDate::Scheduled { month: 11, year: 2025 });

        let payoff = PayoffDateProjector::project_from(2, date(2024, 12, 31));
        assert_eq!(payoff, PayoffDate::Scheduled { month: 2, year: 2025 });
    }

    #[test]
    fn test_project_long_term() {
        let payoff = PayoffDateProjector::project_from(360, date(2024, 1, 1));
        assert_eq!(payoff.month_year(), Some((1, 2054)));
    }

    #[test]
    fn test_month_end_reference() {
        // jan 31 + 1 month lands in february regardless of day clamping
        let payoff = PayoffDateProjector::project_from(1, date(2023, 1, 31));
        assert_eq!(payoff, PayoffDate::Scheduled { month: 2, year: 2023 });
    }

    #[test]
    fn test_non_positive_term_is_undefined() {
        assert_eq!(PayoffDateProjector::project_from(0, date(2024, 1, 1)), PayoffDate::Undefined);
        assert_eq!(PayoffDateProjector::project_from(-5, date(2024, 1, 1)), PayoffDate::Undefined);
        assert!(!PayoffDate::Undefined.is_defined());
    }

    #[test]
    fn test_project_uses_time_provider() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap()
        ));
        let payoff = PayoffDateProjector::project(6, &time);
        assert_eq!(payoff, PayoffDate::Scheduled { month: 4, year: 2027 });
    }

    #[test]
    fn test_display() {
        assert_eq!(PayoffDate::Scheduled { month: 3, year: 2025 }.to_string(), "03/2025");
        assert_eq!(PayoffDate::Undefined.to_string(), "-");
    }
}
