//! Calendar labels for schedule rows

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CalcError, ValidationError};

const RU_MONTHS: [&str; 12] = [
    "янв.", "фев.", "мар.", "апр.", "май", "июн.",
    "июл.", "авг.", "сен.", "окт.", "ноя.", "дек.",
];

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Language used for month labels and payment notes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Locale {
    /// Russian (the product's native locale)
    #[default]
    Ru,
    /// English
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    fn month_names(&self) -> &'static [&'static str; 12] {
        match self {
            Locale::Ru => &RU_MONTHS,
            Locale::En => &EN_MONTHS,
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(ValidationError::UnknownOption {
                field: "locale",
                value: other.to_string(),
            }),
        }
    }
}

/// Abbreviated month and year: `авг. 2025` / `Aug 2025`
pub fn format_month_year(date: NaiveDate, locale: Locale) -> String {
    let name = locale.month_names()[date.month0() as usize];
    format!("{} {}", name, date.year())
}

/// Date of the `month`-th schedule row (1-based), i.e. `start + (month - 1)`
/// calendar months. Day-of-month clamps to the end of shorter months.
pub fn schedule_date(start: NaiveDate, month: u32) -> Result<NaiveDate, CalcError> {
    let offset = month.saturating_sub(1);
    start
        .checked_add_months(Months::new(offset))
        .ok_or(CalcError::DateOverflow { start, months: offset })
}
