/// portfolio - loans on several boards summed into one monthly figure
use installment_boards_rs::{
    AmortizationCalculator, LoanCategory, LoanEntry, LoanInput, Money, Portfolio, PortfolioView,
    RawLoanFields, SafeTimeProvider, TimeSource,
};
use installment_boards_rs::chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));
    let calculator = AmortizationCalculator::default();
    let mut portfolio = Portfolio::default();

    let mortgage = LoanInput::builder()
        .principal(Money::from_major(3_000_000))
        .rate_percent(dec!(6.5))
        .term_months(360)
        .build()?;
    portfolio.insert(LoanEntry::new(LoanCategory::Mortgage, mortgage).with_name("Condo"));

    let car = LoanInput::builder()
        .principal(Money::from_major(600_000))
        .rate_percent(dec!(2.79))
        .term_months(72)
        .flat_rate()
        .build()?;
    portfolio.insert(LoanEntry::new(LoanCategory::Auto, car).with_name("Car"));

    // card typed in by hand, normalized like a form would
    let card_fields = RawLoanFields {
        principal: "45000".to_string(),
        rate: "16".to_string(),
        payment: "3000".to_string(),
        mode: installment_boards_rs::CalculationMode::ByPayment,
        ..RawLoanFields::default()
    };
    portfolio.insert(LoanEntry::new(LoanCategory::CreditCard, card_fields.normalize()));

    // an untouched card does not count
    portfolio.add_loan(LoanCategory::Other);

    let summary = portfolio.summarize_now(&calculator, &time)?;
    println!("{}", PortfolioView::from_summary(&summary).to_json_pretty()?);

    Ok(())
}
