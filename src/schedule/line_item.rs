//! Schedule output structures

use serde::{Deserialize, Serialize};

use crate::calendar::Locale;
use crate::money::format_percent;

/// Classification of a schedule row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Month 1, always
    DownPayment,
    /// One-time payment requested for this month
    Intermediate,
    /// Regular monthly share of the total cost
    Monthly,
    /// Last month, settles whatever balance is left
    Closing,
}

impl PaymentKind {
    pub fn is_onetime(&self) -> bool {
        matches!(self, PaymentKind::DownPayment | PaymentKind::Intermediate)
    }

    /// Human-readable note; `percent` is only shown for one-time payments
    pub fn note(&self, percent: f64, locale: Locale) -> String {
        let pct = format_percent(percent);
        match (self, locale) {
            (PaymentKind::DownPayment, Locale::Ru) => format!("Внесение ПВ {}%", pct),
            (PaymentKind::DownPayment, Locale::En) => format!("Down payment {}%", pct),
            (PaymentKind::Intermediate, Locale::Ru) => format!("Внесение {}%", pct),
            (PaymentKind::Intermediate, Locale::En) => format!("Intermediate payment {}%", pct),
            (PaymentKind::Monthly, Locale::Ru) => "Ежемесячный платёж".to_string(),
            (PaymentKind::Monthly, Locale::En) => "Monthly payment".to_string(),
            (PaymentKind::Closing, Locale::Ru) => {
                "Закрывающий платеж собственными средствами или переход на ипотеку".to_string()
            }
            (PaymentKind::Closing, Locale::En) => {
                "Closing payment from own funds or mortgage refinancing".to_string()
            }
        }
    }
}

/// One scheduled payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLineItem {
    /// Position in the schedule (1-based)
    pub month: u32,
    /// Abbreviated month and year
    pub date: String,
    /// Whole currency units
    pub amount: u64,
    /// Human-readable description in the schedule's locale
    pub note: String,
    /// Down payment or intermediate payment rather than a recurring one
    pub onetime_payment: bool,
    /// Which rule produced this row
    pub kind: PaymentKind,
}

/// Complete schedule for one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    /// Rows in month order, one per schedule month
    pub payment_schedule: Vec<PaymentLineItem>,

    /// Price including markup, unrounded
    pub total_cost: f64,
}

impl PaymentSchedule {
    pub fn new(total_cost: f64) -> Self {
        Self {
            payment_schedule: Vec::new(),
            total_cost,
        }
    }

    pub fn add_item(&mut self, item: PaymentLineItem) {
        self.payment_schedule.push(item);
    }

    pub fn len(&self) -> usize {
        self.payment_schedule.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payment_schedule.is_empty()
    }

    pub fn first_payment(&self) -> u64 {
        self.payment_schedule.first().map(|i| i.amount).unwrap_or(0)
    }

    pub fn last_payment(&self) -> u64 {
        self.payment_schedule.last().map(|i| i.amount).unwrap_or(0)
    }

    /// Sum of the recorded (rounded) amounts
    pub fn total_scheduled(&self) -> u64 {
        self.payment_schedule.iter().map(|i| i.amount).sum()
    }

    /// Sum of down payment and intermediate payments
    pub fn one_time_total(&self) -> u64 {
        self.payment_schedule
            .iter()
            .filter(|i| i.onetime_payment)
            .map(|i| i.amount)
            .sum()
    }

    /// Recorded total minus total cost. Non-zero when rounding or clamping
    /// made the rows diverge from the nominal figure.
    pub fn rounding_drift(&self) -> f64 {
        self.total_scheduled() as f64 - self.total_cost
    }
}
