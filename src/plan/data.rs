//! Installment plan inputs

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;

/// One-time payment scheduled for a specific month
///
/// Travels over the wire as a `[month, percent]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(u32, f64)", into = "(u32, f64)")]
pub struct IntermediatePayment {
    /// Schedule month (1-based) the payment falls on
    pub month: u32,
    /// Share of the total cost, 0-100
    pub percent: f64,
}

impl IntermediatePayment {
    pub fn new(month: u32, percent: f64) -> Self {
        Self { month, percent }
    }
}

impl From<(u32, f64)> for IntermediatePayment {
    fn from((month, percent): (u32, f64)) -> Self {
        Self { month, percent }
    }
}

impl From<IntermediatePayment> for (u32, f64) {
    fn from(p: IntermediatePayment) -> Self {
        (p.month, p.percent)
    }
}

/// What to do when a payment would take the remaining balance below zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BalancePolicy {
    /// Record the overdrawing payment as 0 and keep going
    #[default]
    Clamp,
    /// Cap the payment at the remaining balance so the schedule never
    /// collects more than the total cost
    Reconcile,
}

impl TryFrom<String> for BalancePolicy {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for BalancePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(BalancePolicy::Clamp),
            "reconcile" => Ok(BalancePolicy::Reconcile),
            other => Err(ValidationError::UnknownOption {
                field: "balance_policy",
                value: other.to_string(),
            }),
        }
    }
}

/// Parameters of a real-estate installment purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    /// Base price of the property
    pub property_price: f64,

    /// Flat markup on the base price, 0-100
    pub installment_percentage: f64,

    /// Down payment as a share of the total cost, 0-100
    pub initial_payment_percentage: f64,

    /// Number of monthly schedule rows
    pub installment_period: u32,

    /// Recurring monthly payment as a share of the total cost, 0-100
    pub monthly_payment_percentage: f64,

    /// One-time payments on specific months
    #[serde(default)]
    pub intermediate_payments: Vec<IntermediatePayment>,

    #[serde(default)]
    pub balance_policy: BalancePolicy,
}

impl InstallmentPlan {
    /// Create a plan with no intermediate payments and the default balance policy
    pub fn new(
        property_price: f64,
        installment_percentage: f64,
        initial_payment_percentage: f64,
        installment_period: u32,
        monthly_payment_percentage: f64,
    ) -> Self {
        Self {
            property_price,
            installment_percentage,
            initial_payment_percentage,
            installment_period,
            monthly_payment_percentage,
            intermediate_payments: Vec::new(),
            balance_policy: BalancePolicy::default(),
        }
    }

    pub fn with_intermediate_payments(mut self, payments: Vec<IntermediatePayment>) -> Self {
        self.intermediate_payments = payments;
        self
    }

    pub fn with_balance_policy(mut self, policy: BalancePolicy) -> Self {
        self.balance_policy = policy;
        self
    }

    /// Markup added on top of the base price
    pub fn interest_amount(&self) -> f64 {
        self.property_price * (self.installment_percentage / 100.0)
    }

    /// Price including the markup; every other share is taken of this
    pub fn total_cost(&self) -> f64 {
        self.property_price + self.interest_amount()
    }

    pub fn initial_payment(&self) -> f64 {
        self.total_cost() * (self.initial_payment_percentage / 100.0)
    }

    pub fn monthly_payment(&self) -> f64 {
        self.total_cost() * (self.monthly_payment_percentage / 100.0)
    }

    /// First intermediate payment targeting `month`, if any.
    /// Later entries for the same month are never used.
    pub fn intermediate_for(&self, month: u32) -> Option<&IntermediatePayment> {
        self.intermediate_payments.iter().find(|p| p.month == month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plan_amounts() {
        let plan = InstallmentPlan::new(1000.0, 10.0, 50.0, 3, 10.0);
        assert_relative_eq!(plan.interest_amount(), 100.0);
        assert_relative_eq!(plan.total_cost(), 1100.0);
        assert_relative_eq!(plan.initial_payment(), 550.0);
        assert_relative_eq!(plan.monthly_payment(), 110.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intermediate_first_match() {
        let plan = InstallmentPlan::new(1000.0, 0.0, 10.0, 12, 1.0)
            .with_intermediate_payments(vec![
                IntermediatePayment::new(6, 10.0),
                IntermediatePayment::new(6, 25.0),
            ]);
        assert_eq!(plan.intermediate_for(6).map(|p| p.percent), Some(10.0));
        assert!(plan.intermediate_for(7).is_none());
    }

    #[test]
    fn test_intermediate_wire_format() {
        let payments: Vec<IntermediatePayment> = serde_json::from_str("[[12, 15], [24, 7.5]]").unwrap();
        assert_eq!(payments, vec![
            IntermediatePayment::new(12, 15.0),
            IntermediatePayment::new(24, 7.5),
        ]);
        assert_eq!(serde_json::to_string(&payments[0]).unwrap(), "[12,15.0]");
    }

    #[test]
    fn test_balance_policy_parse() {
        assert_eq!("Reconcile".parse::<BalancePolicy>().unwrap(), BalancePolicy::Reconcile);
        assert_eq!(BalancePolicy::default(), BalancePolicy::Clamp);
        assert!("round".parse::<BalancePolicy>().is_err());
        let policy: BalancePolicy = serde_json::from_str("\"RECONCILE\"").unwrap();
        assert_eq!(policy, BalancePolicy::Reconcile);
        assert_eq!(serde_json::to_string(&policy).unwrap(), "\"reconcile\"");
    }
}
