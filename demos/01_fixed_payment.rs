/// fixed payment - how long a fixed monthly payment takes to clear a loan
use installment_boards_rs::{AmortizationCalculator, Calculation, LoanInput, Money, ResultView};
use installment_boards_rs::chrono::NaiveDate;
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let calculator = AmortizationCalculator::default();
    let reference = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;

    for payment in [500, 1_000, 2_000, 5_000] {
        let reducing = LoanInput::builder()
            .principal(Money::from_major(100_000))
            .rate_percent(dec!(12))
            .fixed_payment(Money::from_major(payment))
            .build()?;
        let flat = LoanInput::builder()
            .principal(Money::from_major(100_000))
            .rate_percent(dec!(12))
            .fixed_payment(Money::from_major(payment))
            .flat_rate()
            .build()?;

        for (label, input) in [("reducing", reducing), ("flat", flat)] {
            print!("{:>6} / month, {:<8}: ", payment, label);
            match calculator.compute_at(&input, reference)? {
                Some(Calculation::Schedule(result)) => {
                    let view = ResultView::from_result(&result);
                    println!(
                        "{} months, interest {}, paid off {}{}",
                        view.term_months,
                        view.total_interest,
                        view.payoff,
                        if view.approximate { " (approximate)" } else { "" }
                    );
                }
                Some(warning @ Calculation::PaymentTooLow { .. }) => {
                    println!(
                        "never amortizes, pay at least {}",
                        warning.suggested_payment().unwrap_or_default()
                    );
                }
                None => println!("nothing to calculate"),
            }
        }
    }

    Ok(())
}
