//! Installment plan inputs and standard presets

mod data;
mod presets;

pub use data::{InstallmentPlan, IntermediatePayment, BalancePolicy};
pub use presets::InstallmentPreset;
