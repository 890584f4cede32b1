//! Investment forecast with annual reinvestment

mod engine;
mod detail;

pub use engine::{
    generate_investment_forecast, DEFAULT_INTEREST_RATE, MIN_STARTING_CAPITAL,
    MAX_STARTING_CAPITAL, MIN_INVESTMENT_YEARS, MAX_INVESTMENT_YEARS,
};
pub use detail::{InvestmentForecast, YearlyDetail};
