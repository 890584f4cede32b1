//! Forecast output structures

use serde::{Deserialize, Serialize};

/// One year of growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyDetail {
    /// Year number (1-based)
    pub year: u32,
    pub start_amount: f64,
    pub yearly_profit: f64,
    pub end_amount: f64,
}

/// Complete forecast for one investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentForecast {
    /// Capital at the end of the term
    pub total_amount: f64,

    /// `total_amount` minus the starting capital
    pub profit: f64,

    pub yearly_details: Vec<YearlyDetail>,
}

impl InvestmentForecast {
    pub fn years(&self) -> u32 {
        self.yearly_details.len() as u32
    }

    /// Growth over the whole term as a percentage of the starting capital
    pub fn total_return_pct(&self) -> f64 {
        let start = self
            .yearly_details
            .first()
            .map(|d| d.start_amount)
            .unwrap_or(self.total_amount);
        if start <= 0.0 {
            0.0
        } else {
            self.profit / start * 100.0
        }
    }
}
