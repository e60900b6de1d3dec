/// quick start - monthly installment for a fixed term
use installment_boards_rs::{
    AmortizationCalculator, LoanInput, Money, ResultView, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let time = SafeTimeProvider::new(TimeSource::System);
    let calculator = AmortizationCalculator::default();

    // 100,000 at 12% a year over 12 months
    let input = LoanInput::builder()
        .principal(Money::from_major(100_000))
        .rate_percent(dec!(12))
        .term_months(12)
        .build()?;

    match calculator.compute(&input, &time)? {
        Some(outcome) => match outcome.schedule() {
            Some(result) => println!("{}", ResultView::from_result(result).to_json_pretty()?),
            None => println!("payment too low: {:?}", outcome.min_required()),
        },
        None => println!("nothing to calculate"),
    }

    Ok(())
}
