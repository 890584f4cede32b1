//! Annual compounding forecast
//!
//! Full reinvestment: each year's profit is added to the capital the next
//! year earns on. No withdrawals, no fees.

use crate::money::round_cents;
use super::detail::{InvestmentForecast, YearlyDetail};

/// Rate used when a request does not name one (percent per year)
pub const DEFAULT_INTEREST_RATE: f64 = 15.0;

pub const MIN_STARTING_CAPITAL: f64 = 9_000_000.0;
pub const MAX_STARTING_CAPITAL: f64 = 1_000_000_000.0;
pub const MIN_INVESTMENT_YEARS: u32 = 1;
pub const MAX_INVESTMENT_YEARS: u32 = 100;

/// Compound `starting_capital` at `annual_interest_rate` percent for `years`.
///
/// The running balance stays unrounded; every reported figure is rounded to
/// 2 decimals.
pub fn generate_investment_forecast(
    starting_capital: f64,
    years: u32,
    annual_interest_rate: f64,
) -> InvestmentForecast {
    let mut balance = starting_capital;
    let mut yearly_details = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let start_amount = balance;
        let yearly_profit = start_amount * (annual_interest_rate / 100.0);
        let end_amount = start_amount + yearly_profit;

        yearly_details.push(YearlyDetail {
            year,
            start_amount: round_cents(start_amount),
            yearly_profit: round_cents(yearly_profit),
            end_amount: round_cents(end_amount),
        });

        balance = end_amount;
    }

    InvestmentForecast {
        total_amount: round_cents(balance),
        profit: round_cents(balance - starting_capital),
        yearly_details,
    }
}
