//! Installment payment schedules

mod state;
mod generator;
mod line_item;

pub use state::ScheduleState;
pub use generator::{ScheduleGenerator, ScheduleConfig, generate_payment_schedule};
pub use line_item::{PaymentKind, PaymentLineItem, PaymentSchedule};
