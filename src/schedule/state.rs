//! Running balance for one schedule generation

use crate::money::round_to_units;
use crate::plan::BalancePolicy;

/// Balance state while walking the schedule month by month
#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// Current schedule month (1-indexed, 0 before the first advance)
    pub month: u32,

    /// Unpaid part of the total cost, before rounding
    pub remaining_balance: f64,

    /// How a payment larger than the remaining balance is recorded
    policy: BalancePolicy,
}

impl ScheduleState {
    pub fn new(total_cost: f64, policy: BalancePolicy) -> Self {
        Self {
            month: 0,
            remaining_balance: total_cost,
            policy,
        }
    }

    pub fn advance_month(&mut self) {
        self.month += 1;
    }

    /// Take `amount` off the balance and return what the row records.
    ///
    /// Clamp: the full amount is deducted and the row shows 0 if that left
    /// the balance negative. Reconcile: the amount is first capped at the
    /// remaining balance.
    pub fn apply_payment(&mut self, amount: f64) -> u64 {
        match self.policy {
            BalancePolicy::Clamp => {
                self.remaining_balance -= amount;
                if self.remaining_balance < 0.0 {
                    0
                } else {
                    round_to_units(amount)
                }
            }
            BalancePolicy::Reconcile => {
                let capped = amount.min(self.remaining_balance).max(0.0);
                self.remaining_balance -= capped;
                round_to_units(capped)
            }
        }
    }
}
