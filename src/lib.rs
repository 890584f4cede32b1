//! Installment Calculator - payment schedules and investment forecasts for real-estate purchases
//!
//! This library provides:
//! - Monthly payment schedules for installment purchases (down payment,
//!   intermediate one-time payments, recurring payments, closing payment)
//! - Year-by-year compounding investment forecasts
//! - Request validation and routing for the HTTP service
//! - CSV schedule documents for download

pub mod api;
pub mod calendar;
pub mod config;
pub mod document;
pub mod error;
pub mod forecast;
pub mod money;
pub mod plan;
pub mod scenario;
pub mod schedule;
pub mod validation;

// Re-export commonly used types
pub use calendar::Locale;
pub use config::ServiceConfig;
pub use error::{CalcError, ValidationError};
pub use forecast::{generate_investment_forecast, InvestmentForecast, YearlyDetail};
pub use plan::{BalancePolicy, InstallmentPlan, InstallmentPreset, IntermediatePayment};
pub use scenario::ScenarioRunner;
pub use schedule::{generate_payment_schedule, PaymentLineItem, PaymentSchedule, ScheduleGenerator};
