//! Service configuration from environment variables
//!
//! Every setting falls back to its default when unset or unparsable:
//!   ALLOWED_ORIGINS            comma-separated CORS origins
//!   DEFAULT_LOCALE             ru | en
//!   DEFAULT_INTEREST_RATE      forecast rate when a request omits one
//!   MAX_INSTALLMENT_PERIOD     longest accepted schedule, in months
//!   DOCUMENT_UTC_OFFSET_HOURS  offset applied to the document timestamp

use std::env;

use crate::calendar::Locale;
use crate::forecast::DEFAULT_INTEREST_RATE;

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:443",
    "https://tamerun-invest.ru",
    "http://0.0.0.0:443",
];

/// 100 years of monthly rows
pub const DEFAULT_MAX_INSTALLMENT_PERIOD: u32 = 1200;

/// Moscow time, which the documents were always stamped in
pub const DEFAULT_DOCUMENT_UTC_OFFSET_HOURS: i32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub allowed_origins: Vec<String>,
    pub default_locale: Locale,
    pub default_interest_rate: f64,
    pub max_installment_period: u32,
    pub document_utc_offset_hours: i32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            default_locale: Locale::Ru,
            default_interest_rate: DEFAULT_INTEREST_RATE,
            max_installment_period: DEFAULT_MAX_INSTALLMENT_PERIOD,
            document_utc_offset_hours: DEFAULT_DOCUMENT_UTC_OFFSET_HOURS,
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let allowed_origins: Vec<String> = lookup("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .filter(|origins: &Vec<String>| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        let default_locale: Locale = lookup("DEFAULT_LOCALE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.default_locale);

        let default_interest_rate: f64 = lookup("DEFAULT_INTEREST_RATE")
            .and_then(|s| s.parse().ok())
            .filter(|r: &f64| (0.0..=100.0).contains(r))
            .unwrap_or(defaults.default_interest_rate);

        let max_installment_period: u32 = lookup("MAX_INSTALLMENT_PERIOD")
            .and_then(|s| s.parse().ok())
            .filter(|p: &u32| *p > 0)
            .unwrap_or(defaults.max_installment_period);

        let document_utc_offset_hours: i32 = lookup("DOCUMENT_UTC_OFFSET_HOURS")
            .and_then(|s| s.parse().ok())
            .filter(|h: &i32| (-23..=23).contains(h))
            .unwrap_or(defaults.document_utc_offset_hours);

        Self {
            allowed_origins,
            default_locale,
            default_interest_rate,
            max_installment_period,
            document_utc_offset_hours,
        }
    }

    /// Origin to echo back in `Access-Control-Allow-Origin`
    pub fn cors_origin(&self, request_origin: Option<&str>) -> String {
        match request_origin {
            Some(origin) if self.allowed_origins.iter().any(|o| o == "*" || o == origin) => {
                origin.to_string()
            }
            _ => self.allowed_origins.first().cloned().unwrap_or_else(|| "*".to_string()),
        }
    }
}
