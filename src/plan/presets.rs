//! Standard installment offers shown to buyers

use serde::{Deserialize, Serialize};

use super::{InstallmentPlan, IntermediatePayment};

/// The five standard installment terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentPreset {
    Months6,
    Months12,
    Months18,
    Months24,
    Months36,
}

impl InstallmentPreset {
    pub const ALL: [InstallmentPreset; 5] = [
        InstallmentPreset::Months6,
        InstallmentPreset::Months12,
        InstallmentPreset::Months18,
        InstallmentPreset::Months24,
        InstallmentPreset::Months36,
    ];

    /// Look up a preset by its term in months
    pub fn from_months(months: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.months() == months)
    }

    pub fn months(&self) -> u32 {
        match self {
            InstallmentPreset::Months6 => 6,
            InstallmentPreset::Months12 => 12,
            InstallmentPreset::Months18 => 18,
            InstallmentPreset::Months24 => 24,
            InstallmentPreset::Months36 => 36,
        }
    }

    /// (down payment %, markup %, monthly %)
    fn terms(&self) -> (f64, f64, f64) {
        match self {
            InstallmentPreset::Months6 => (50.0, 0.0, 0.0),
            InstallmentPreset::Months12 => (20.0, 5.0, 0.5),
            InstallmentPreset::Months18 => (30.0, 7.5, 0.74),
            InstallmentPreset::Months24 => (35.0, 10.0, 0.99),
            InstallmentPreset::Months36 => (30.0, 20.0, 0.16),
        }
    }

    fn intermediate_payments(&self) -> Vec<IntermediatePayment> {
        match self {
            InstallmentPreset::Months6 => Vec::new(),
            InstallmentPreset::Months12 => vec![IntermediatePayment::new(7, 10.0)],
            InstallmentPreset::Months18 => vec![IntermediatePayment::new(10, 10.0)],
            InstallmentPreset::Months24 => vec![IntermediatePayment::new(12, 15.0)],
            InstallmentPreset::Months36 => vec![
                IntermediatePayment::new(12, 10.0),
                IntermediatePayment::new(24, 10.0),
            ],
        }
    }
}

impl InstallmentPlan {
    /// Build the standard offer for `preset` at the given base price
    pub fn from_preset(preset: InstallmentPreset, property_price: f64) -> Self {
        let (initial, markup, monthly) = preset.terms();
        InstallmentPlan::new(property_price, markup, initial, preset.months(), monthly)
            .with_intermediate_payments(preset.intermediate_payments())
    }
}
