//! Payment schedule generation for installment purchases

use chrono::NaiveDate;

use crate::calendar::{format_month_year, schedule_date, Locale};
use crate::error::{CalcError, Result};
use crate::plan::{InstallmentPlan, IntermediatePayment};
use super::line_item::{PaymentKind, PaymentLineItem, PaymentSchedule};
use super::state::ScheduleState;

/// Settings that do not change the arithmetic
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Date of the down payment; row N is dated N-1 months later
    pub start_date: NaiveDate,

    /// Language of notes and month labels
    pub locale: Locale,
}

impl ScheduleConfig {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            locale: Locale::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

/// Builds the month-by-month schedule for a plan
pub struct ScheduleGenerator {
    config: ScheduleConfig,
}

impl ScheduleGenerator {
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    /// Generate the full schedule for `plan`
    pub fn generate(&self, plan: &InstallmentPlan) -> Result<PaymentSchedule> {
        let total_cost = plan.total_cost();
        if !total_cost.is_finite() {
            return Err(CalcError::NonFinite("total_cost"));
        }

        let initial_payment = plan.initial_payment();
        let monthly_payment = plan.monthly_payment();

        let mut schedule = PaymentSchedule::new(total_cost);
        let mut state = ScheduleState::new(total_cost, plan.balance_policy);

        for _ in 1..=plan.installment_period {
            state.advance_month();

            let (kind, percent, amount) = match self.classify(plan, state.month) {
                PaymentKind::DownPayment => (
                    PaymentKind::DownPayment,
                    plan.initial_payment_percentage,
                    initial_payment,
                ),
                PaymentKind::Intermediate => {
                    let percent = plan
                        .intermediate_for(state.month)
                        .map(|p| p.percent)
                        .unwrap_or(0.0);
                    (PaymentKind::Intermediate, percent, total_cost * (percent / 100.0))
                }
                // Takes whatever is left, absorbing all drift from the flat shares
                PaymentKind::Closing => (PaymentKind::Closing, 0.0, state.remaining_balance),
                PaymentKind::Monthly => (
                    PaymentKind::Monthly,
                    plan.monthly_payment_percentage,
                    monthly_payment,
                ),
            };

            let recorded = state.apply_payment(amount);
            let date = schedule_date(self.config.start_date, state.month)?;

            schedule.add_item(PaymentLineItem {
                month: state.month,
                date: format_month_year(date, self.config.locale),
                amount: recorded,
                note: kind.note(percent, self.config.locale),
                onetime_payment: kind.is_onetime(),
                kind,
            });
        }

        Ok(schedule)
    }

    /// Which kind of payment falls on `month`, by priority:
    /// down payment, intermediate, closing, monthly
    fn classify(&self, plan: &InstallmentPlan, month: u32) -> PaymentKind {
        if month == 1 {
            PaymentKind::DownPayment
        } else if plan.intermediate_for(month).is_some() {
            PaymentKind::Intermediate
        } else if month == plan.installment_period {
            PaymentKind::Closing
        } else {
            PaymentKind::Monthly
        }
    }
}

/// Generate a schedule with the flat argument list used by the HTTP layer.
///
/// `start_date` is required; callers that want "today" resolve it themselves.
#[allow(clippy::too_many_arguments)]
pub fn generate_payment_schedule(
    property_price: f64,
    installment_percentage: f64,
    initial_payment_percentage: f64,
    installment_period: u32,
    monthly_payment_percentage: f64,
    start_date: NaiveDate,
    intermediate_payments: &[IntermediatePayment],
) -> Result<PaymentSchedule> {
    let plan = InstallmentPlan::new(
        property_price,
        installment_percentage,
        initial_payment_percentage,
        installment_period,
        monthly_payment_percentage,
    )
    .with_intermediate_payments(intermediate_payments.to_vec());

    ScheduleGenerator::new(ScheduleConfig::new(start_date)).generate(&plan)
}
