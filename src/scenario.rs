//! Scenario runner for comparing many plans at once
//!
//! Holds the schedule settings once, then evaluates any number of plans in
//! parallel. Each plan is independent, so results come back in input order.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calendar::Locale;
use crate::error::Result;
use crate::plan::{InstallmentPlan, InstallmentPreset};
use crate::schedule::{PaymentSchedule, ScheduleConfig, ScheduleGenerator};

/// Headline figures for one preset at a given price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetComparison {
    pub months: u32,
    pub total_cost: f64,
    pub first_payment: u64,
    pub one_time_total: u64,
    pub last_payment: u64,
    pub total_scheduled: u64,
}

impl PresetComparison {
    fn from_schedule(months: u32, schedule: &PaymentSchedule) -> Self {
        Self {
            months,
            total_cost: schedule.total_cost,
            first_payment: schedule.first_payment(),
            one_time_total: schedule.one_time_total(),
            last_payment: schedule.last_payment(),
            total_scheduled: schedule.total_scheduled(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: ScheduleConfig,
}

impl ScenarioRunner {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            config: ScheduleConfig::new(start_date),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.config = self.config.with_locale(locale);
        self
    }

    /// Schedule for a single plan
    pub fn run(&self, plan: &InstallmentPlan) -> Result<PaymentSchedule> {
        ScheduleGenerator::new(self.config.clone()).generate(plan)
    }

    /// Schedules for many plans, in input order
    pub fn run_batch(&self, plans: &[InstallmentPlan]) -> Result<Vec<PaymentSchedule>> {
        plans
            .par_iter()
            .map(|plan| ScheduleGenerator::new(self.config.clone()).generate(plan))
            .collect()
    }

    /// Every standard preset at `property_price`, shortest term first
    pub fn compare_presets(&self, property_price: f64) -> Result<Vec<PresetComparison>> {
        let plans: Vec<InstallmentPlan> = InstallmentPreset::ALL
            .iter()
            .map(|&preset| InstallmentPlan::from_preset(preset, property_price))
            .collect();

        let schedules = self.run_batch(&plans)?;
        Ok(plans
            .iter()
            .zip(&schedules)
            .map(|(plan, schedule)| PresetComparison::from_schedule(plan.installment_period, schedule))
            .collect())
    }
}
