//! Request validation
//!
//! Request bodies deserialize into `ScheduleBody` / `ForecastBody`; the
//! range checks then run on the typed values. The generators assume every
//! precondition checked here; nothing out of range gets past.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::error::Category;
use std::collections::HashSet;

use crate::calendar::Locale;
use crate::config::ServiceConfig;
use crate::error::ValidationError;
use crate::forecast::{
    MAX_INVESTMENT_YEARS, MAX_STARTING_CAPITAL, MIN_INVESTMENT_YEARS, MIN_STARTING_CAPITAL,
};
use crate::plan::{BalancePolicy, InstallmentPlan, IntermediatePayment};

pub const MAX_APARTMENT_NUMBER: u32 = 999_999;

/// Validated schedule request
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRequest {
    pub plan: InstallmentPlan,
    pub start_date: NaiveDate,
    pub locale: Locale,
    pub apartment_number: Option<u32>,
}

/// Validated forecast request
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub starting_capital: f64,
    pub years: u32,
    pub annual_interest_rate: f64,
}

/// Raw schedule request body. Every field is optional here so a missing
/// field reports by name instead of as a parse error.
#[derive(Debug, Default, PartialEq, Deserialize)]
struct ScheduleBody {
    #[serde(default, deserialize_with = "number_or_string")]
    property_price: Option<f64>,

    #[serde(default, deserialize_with = "number_or_string")]
    installment_percentage: Option<f64>,

    #[serde(default, deserialize_with = "number_or_string")]
    initial_payment_percentage: Option<f64>,

    #[serde(default, deserialize_with = "integer_or_string")]
    installment_period: Option<i64>,

    #[serde(default, deserialize_with = "number_or_string")]
    monthly_payment_percentage: Option<f64>,

    /// `[[month, percent], ...]`; `null` means none
    #[serde(default)]
    intermediate_payments: Option<Vec<IntermediatePayment>>,

    /// ISO 8601 date or date-time; defaults to today
    #[serde(default)]
    initial_payment_date: Option<String>,

    #[serde(default)]
    locale: Option<Locale>,

    #[serde(default)]
    balance_policy: Option<BalancePolicy>,

    /// Only printed on the downloadable document
    #[serde(default, deserialize_with = "integer_or_string")]
    apartment_number: Option<i64>,
}

/// Raw forecast request body
#[derive(Debug, Default, PartialEq, Deserialize)]
struct ForecastBody {
    #[serde(default, deserialize_with = "number_or_string")]
    starting_capital: Option<f64>,

    #[serde(default, deserialize_with = "integer_or_string")]
    years: Option<i64>,

    /// Percent per year; the configured default when absent
    #[serde(default, deserialize_with = "number_or_string")]
    annual_interest_rate: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntegerOrString {
    Integer(i64),
    Text(String),
}

/// A finite number, or a string holding one
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberOrString>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(NumberOrString::Number(n)) => n,
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got '{}'", s)))?,
    };
    if !value.is_finite() {
        return Err(de::Error::custom("expected a finite number"));
    }
    Ok(Some(value))
}

/// A whole number, or a string holding one
fn integer_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntegerOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntegerOrString::Integer(n)) => Ok(Some(n)),
        Some(IntegerOrString::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected an integer, got '{}'", s))),
    }
}

/// Deserialize a request body. An empty body, `null` or `{}` is
/// `MissingBody`; bad syntax is `MalformedJson`; wrong types or unknown
/// option values are `InvalidField`.
fn parse_body<T>(body: &str) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Default + PartialEq,
{
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(ValidationError::MissingBody);
    }
    let parsed: T = serde_json::from_str(trimmed).map_err(|e| match e.classify() {
        Category::Data => ValidationError::InvalidField(e.to_string()),
        _ => ValidationError::MalformedJson(e.to_string()),
    })?;
    if parsed == T::default() {
        return Err(ValidationError::MissingBody);
    }
    Ok(parsed)
}

fn required<T>(value: Option<T>, name: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(name))
}

fn check_percentage(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: name,
            reason: format!("{} is not within 0..=100", value),
        });
    }
    Ok(())
}

/// Parse `initial_payment_date`: RFC 3339 with offset, a naive date-time or
/// a plain date. The calendar date is taken as written, offset ignored.
pub fn parse_start_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| ValidationError::InvalidDate(format!("'{}': {}", raw, e)))
}

/// Validate a schedule request body.
///
/// `today` stands in for a missing `initial_payment_date`.
/// `require_apartment` is set for the document download, which prints it.
pub fn validate_schedule_request(
    body: &str,
    config: &ServiceConfig,
    today: NaiveDate,
    require_apartment: bool,
) -> Result<ScheduleRequest, ValidationError> {
    let body: ScheduleBody = parse_body(body)?;

    let property_price = required(body.property_price, "property_price")?;
    let installment_percentage = required(body.installment_percentage, "installment_percentage")?;
    let initial_payment_percentage =
        required(body.initial_payment_percentage, "initial_payment_percentage")?;
    let period = required(body.installment_period, "installment_period")?;
    let monthly_payment_percentage =
        required(body.monthly_payment_percentage, "monthly_payment_percentage")?;

    let installment_period = u32::try_from(period).map_err(|_| ValidationError::OutOfRange {
        field: "installment_period",
        reason: format!("{} is not within 1..={}", period, config.max_installment_period),
    })?;

    let plan = InstallmentPlan::new(
        property_price,
        installment_percentage,
        initial_payment_percentage,
        installment_period,
        monthly_payment_percentage,
    )
    .with_intermediate_payments(body.intermediate_payments.unwrap_or_default())
    .with_balance_policy(body.balance_policy.unwrap_or_default());
    check_plan(&plan, config)?;

    let start_date = match body.initial_payment_date.as_deref() {
        Some(raw) => parse_start_date(raw)?,
        None => today,
    };

    let apartment_number = match body.apartment_number {
        Some(number) => match u32::try_from(number) {
            Ok(n) if n <= MAX_APARTMENT_NUMBER => Some(n),
            _ => {
                return Err(ValidationError::OutOfRange {
                    field: "apartment_number",
                    reason: format!("{} is not within 0..={}", number, MAX_APARTMENT_NUMBER),
                })
            }
        },
        None if require_apartment => return Err(ValidationError::MissingField("apartment_number")),
        None => None,
    };

    Ok(ScheduleRequest {
        plan,
        start_date,
        locale: body.locale.unwrap_or(config.default_locale),
        apartment_number,
    })
}

/// Range checks shared by the HTTP boundary and the CLI.
///
/// Besides the per-field ranges, the derived total cost must be finite so
/// the generator never sees an overflowed figure.
pub fn check_plan(plan: &InstallmentPlan, config: &ServiceConfig) -> Result<(), ValidationError> {
    if !plan.property_price.is_finite() || plan.property_price < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "property_price",
            reason: "must be a non-negative number".to_string(),
        });
    }
    check_percentage("installment_percentage", plan.installment_percentage)?;
    check_percentage("initial_payment_percentage", plan.initial_payment_percentage)?;
    check_percentage("monthly_payment_percentage", plan.monthly_payment_percentage)?;

    let period = plan.installment_period;
    if period < 1 || period > config.max_installment_period {
        return Err(ValidationError::OutOfRange {
            field: "installment_period",
            reason: format!("{} is not within 1..={}", period, config.max_installment_period),
        });
    }

    let mut seen = HashSet::new();
    for payment in &plan.intermediate_payments {
        if payment.month < 1 || payment.month > period {
            return Err(ValidationError::IntermediateMonth { month: payment.month as i64, period });
        }
        if !(0.0..=100.0).contains(&payment.percent) {
            return Err(ValidationError::IntermediatePercent(payment.percent));
        }
        if !seen.insert(payment.month) {
            return Err(ValidationError::DuplicateIntermediateMonth(payment.month));
        }
    }

    let derived = [plan.total_cost(), plan.initial_payment(), plan.monthly_payment()];
    if derived.iter().any(|amount| !amount.is_finite()) {
        return Err(ValidationError::OutOfRange {
            field: "property_price",
            reason: "total cost including markup is too large".to_string(),
        });
    }
    Ok(())
}

/// Validate a forecast request body
pub fn validate_forecast_request(
    body: &str,
    config: &ServiceConfig,
) -> Result<ForecastRequest, ValidationError> {
    let body: ForecastBody = parse_body(body)?;

    let starting_capital = required(body.starting_capital, "starting_capital")?;
    let years = required(body.years, "years")?;
    let years = u32::try_from(years).map_err(|_| ValidationError::OutOfRange {
        field: "years",
        reason: format!(
            "must be between {} and {}",
            MIN_INVESTMENT_YEARS, MAX_INVESTMENT_YEARS
        ),
    })?;

    let request = ForecastRequest {
        starting_capital,
        years,
        annual_interest_rate: body
            .annual_interest_rate
            .unwrap_or(config.default_interest_rate),
    };
    check_forecast(&request)?;
    Ok(request)
}

/// Range checks for a forecast, shared by the HTTP boundary and the CLI
pub fn check_forecast(request: &ForecastRequest) -> Result<(), ValidationError> {
    if !(MIN_STARTING_CAPITAL..=MAX_STARTING_CAPITAL).contains(&request.starting_capital) {
        return Err(ValidationError::OutOfRange {
            field: "starting_capital",
            reason: format!(
                "must be between {} and {}",
                MIN_STARTING_CAPITAL, MAX_STARTING_CAPITAL
            ),
        });
    }
    if !(MIN_INVESTMENT_YEARS..=MAX_INVESTMENT_YEARS).contains(&request.years) {
        return Err(ValidationError::OutOfRange {
            field: "years",
            reason: format!(
                "must be between {} and {}",
                MIN_INVESTMENT_YEARS, MAX_INVESTMENT_YEARS
            ),
        });
    }
    if !(0.0..=100.0).contains(&request.annual_interest_rate) {
        return Err(ValidationError::OutOfRange {
            field: "annual_interest_rate",
            reason: "must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 14).unwrap()
    }

    fn schedule(body: &str) -> Result<ScheduleRequest, ValidationError> {
        validate_schedule_request(body, &ServiceConfig::default(), today(), false)
    }

    const BASE: &str = r#"{
        "property_price": 10102330,
        "installment_percentage": 10,
        "initial_payment_percentage": 35,
        "installment_period": 24,
        "monthly_payment_percentage": 0.99,
        "intermediate_payments": [[12, 15]],
        "initial_payment_date": "2025-11-25T00:00:00+03:00"
    }"#;

    #[test]
    fn test_valid_schedule_request() {
        let req = schedule(BASE).unwrap();
        assert_eq!(req.plan.property_price, 10_102_330.0);
        assert_eq!(req.plan.installment_period, 24);
        assert_eq!(req.plan.intermediate_payments, vec![IntermediatePayment::new(12, 15.0)]);
        assert_eq!(req.start_date, NaiveDate::from_ymd_opt(2025, 11, 25).unwrap());
        assert_eq!(req.locale, Locale::Ru);
        assert_eq!(req.plan.balance_policy, BalancePolicy::Clamp);
        assert_eq!(req.apartment_number, None);
    }

    #[test]
    fn test_defaults_start_date_to_today() {
        let req = schedule(r#"{"property_price": 1000, "installment_percentage": 10,
            "initial_payment_percentage": 50, "installment_period": 3,
            "monthly_payment_percentage": 10, "intermediate_payments": null}"#).unwrap();
        assert_eq!(req.start_date, today());
        assert!(req.plan.intermediate_payments.is_empty());
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let req = schedule(r#"{"property_price": "1000.5", "installment_percentage": "10",
            "initial_payment_percentage": 50, "installment_period": "3",
            "monthly_payment_percentage": 10}"#).unwrap();
        assert_eq!(req.plan.property_price, 1000.5);
        assert_eq!(req.plan.installment_period, 3);
    }

    #[test]
    fn test_empty_and_malformed_bodies() {
        assert_eq!(schedule(""), Err(ValidationError::MissingBody));
        assert_eq!(schedule("{}"), Err(ValidationError::MissingBody));
        assert!(matches!(schedule("{not json"), Err(ValidationError::MalformedJson(_))));
        assert_eq!(schedule("null"), Err(ValidationError::MissingBody));
        assert!(matches!(schedule("\"text\""), Err(ValidationError::InvalidField(_))));
    }

    #[test]
    fn test_missing_and_out_of_range_fields() {
        assert_eq!(
            schedule(r#"{"property_price": 1000}"#),
            Err(ValidationError::MissingField("installment_percentage"))
        );
        let negative = BASE.replace("10102330", "-5");
        assert!(matches!(schedule(&negative), Err(ValidationError::OutOfRange { field: "property_price", .. })));
        let too_high = BASE.replace("\"installment_percentage\": 10", "\"installment_percentage\": 101");
        assert!(matches!(schedule(&too_high), Err(ValidationError::OutOfRange { field: "installment_percentage", .. })));
        let zero_period = BASE.replace("\"installment_period\": 24", "\"installment_period\": 0");
        assert!(matches!(schedule(&zero_period), Err(ValidationError::OutOfRange { field: "installment_period", .. })));
        let fractional = BASE.replace("\"installment_period\": 24", "\"installment_period\": 2.5");
        assert!(matches!(schedule(&fractional), Err(ValidationError::InvalidField(_))));
        let word = BASE.replace("10102330", "\"ten million\"");
        assert!(matches!(schedule(&word), Err(ValidationError::InvalidField(msg)) if msg.contains("ten million")));
    }

    #[test]
    fn test_period_limited_by_config() {
        let config = ServiceConfig { max_installment_period: 12, ..ServiceConfig::default() };
        let result = validate_schedule_request(BASE, &config, today(), false);
        assert!(matches!(result, Err(ValidationError::OutOfRange { field: "installment_period", .. })));
    }

    #[test]
    fn test_intermediate_payment_checks() {
        let shape = BASE.replace("[[12, 15]]", "[[12]]");
        assert!(matches!(schedule(&shape), Err(ValidationError::InvalidField(_))));
        let not_list = BASE.replace("[[12, 15]]", "\"12:15\"");
        assert!(matches!(schedule(&not_list), Err(ValidationError::InvalidField(_))));
        let month = BASE.replace("[[12, 15]]", "[[25, 15]]");
        assert_eq!(schedule(&month), Err(ValidationError::IntermediateMonth { month: 25, period: 24 }));
        let zero = BASE.replace("[[12, 15]]", "[[0, 15]]");
        assert_eq!(schedule(&zero), Err(ValidationError::IntermediateMonth { month: 0, period: 24 }));
        let percent = BASE.replace("[[12, 15]]", "[[12, 150]]");
        assert_eq!(schedule(&percent), Err(ValidationError::IntermediatePercent(150.0)));
        let duplicate = BASE.replace("[[12, 15]]", "[[12, 15], [6, 5], [12, 10]]");
        assert_eq!(schedule(&duplicate), Err(ValidationError::DuplicateIntermediateMonth(12)));
    }

    #[test]
    fn test_options() {
        let en = BASE.replace("\"installment_period\": 24", "\"installment_period\": 24, \"locale\": \"en\", \"balance_policy\": \"reconcile\"");
        let req = schedule(&en).unwrap();
        assert_eq!(req.locale, Locale::En);
        assert_eq!(req.plan.balance_policy, BalancePolicy::Reconcile);

        let bad = BASE.replace("\"installment_period\": 24", "\"installment_period\": 24, \"locale\": \"de\"");
        assert!(matches!(schedule(&bad), Err(ValidationError::InvalidField(msg)) if msg.contains("unknown locale 'de'")));

        let upper = BASE.replace("\"installment_period\": 24", "\"installment_period\": 24, \"locale\": \"EN\"");
        assert_eq!(schedule(&upper).unwrap().locale, Locale::En);
    }

    #[test]
    fn test_apartment_number() {
        let config = ServiceConfig::default();
        assert_eq!(
            validate_schedule_request(BASE, &config, today(), true),
            Err(ValidationError::MissingField("apartment_number"))
        );
        let with = BASE.replace("\"installment_period\": 24", "\"installment_period\": 24, \"apartment_number\": 2");
        let req = validate_schedule_request(&with, &config, today(), true).unwrap();
        assert_eq!(req.apartment_number, Some(2));
        let big = BASE.replace("\"installment_period\": 24", "\"installment_period\": 24, \"apartment_number\": 1000000");
        assert!(matches!(
            validate_schedule_request(&big, &config, today(), true),
            Err(ValidationError::OutOfRange { field: "apartment_number", .. })
        ));
    }

    #[test]
    fn test_parse_start_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 25).unwrap();
        assert_eq!(parse_start_date("2025-11-25T00:00:00+03:00").unwrap(), expected);
        assert_eq!(parse_start_date("2025-11-25T23:30:00Z").unwrap(), expected);
        assert_eq!(parse_start_date("2025-11-25T10:15:00").unwrap(), expected);
        assert_eq!(parse_start_date("2025-11-25").unwrap(), expected);
        assert!(matches!(parse_start_date("25.11.2025"), Err(ValidationError::InvalidDate(_))));
    }

    #[test]
    fn test_check_plan() {
        let config = ServiceConfig::default();
        let plan = InstallmentPlan::new(1000.0, 10.0, 50.0, 3, 10.0)
            .with_intermediate_payments(vec![IntermediatePayment::new(2, 10.0)]);
        assert_eq!(check_plan(&plan, &config), Ok(()));

        let bad = InstallmentPlan { monthly_payment_percentage: 120.0, ..plan.clone() };
        assert!(matches!(check_plan(&bad, &config), Err(ValidationError::OutOfRange { .. })));

        let late = plan.clone().with_intermediate_payments(vec![IntermediatePayment::new(4, 10.0)]);
        assert_eq!(check_plan(&late, &config), Err(ValidationError::IntermediateMonth { month: 4, period: 3 }));

        let dup = plan.with_intermediate_payments(vec![
            IntermediatePayment::new(2, 10.0),
            IntermediatePayment::new(2, 5.0),
        ]);
        assert_eq!(check_plan(&dup, &config), Err(ValidationError::DuplicateIntermediateMonth(2)));
    }

    #[test]
    fn test_forecast_request() {
        let config = ServiceConfig::default();
        let req = validate_forecast_request(r#"{"starting_capital": 9000000, "years": 5}"#, &config).unwrap();
        assert_eq!(req.starting_capital, 9_000_000.0);
        assert_eq!(req.years, 5);
        assert_eq!(req.annual_interest_rate, 15.0);

        let req = validate_forecast_request(
            r#"{"starting_capital": 9000000, "years": 5, "annual_interest_rate": 7.5}"#,
            &config,
        ).unwrap();
        assert_eq!(req.annual_interest_rate, 7.5);
    }

    #[test]
    fn test_forecast_bounds() {
        let config = ServiceConfig::default();
        let low = validate_forecast_request(r#"{"starting_capital": 100, "years": 5}"#, &config);
        assert!(matches!(low, Err(ValidationError::OutOfRange { field: "starting_capital", .. })));
        let years = validate_forecast_request(r#"{"starting_capital": 9000000, "years": 101}"#, &config);
        assert!(matches!(years, Err(ValidationError::OutOfRange { field: "years", .. })));
        let rate = validate_forecast_request(
            r#"{"starting_capital": 9000000, "years": 1, "annual_interest_rate": -1}"#,
            &config,
        );
        assert!(matches!(rate, Err(ValidationError::OutOfRange { field: "annual_interest_rate", .. })));
        let missing = validate_forecast_request(r#"{"years": 1}"#, &config);
        assert_eq!(missing, Err(ValidationError::MissingField("starting_capital")));
    }

    #[test]
    fn test_overflowing_total_cost_rejected() {
        let body = BASE
            .replace("10102330", "1e308")
            .replace("\"installment_percentage\": 10", "\"installment_percentage\": 100");
        assert!(matches!(schedule(&body), Err(ValidationError::OutOfRange { field: "property_price", .. })));

        let plan = InstallmentPlan::new(f64::MAX, 100.0, 50.0, 3, 10.0);
        assert!(matches!(
            check_plan(&plan, &ServiceConfig::default()),
            Err(ValidationError::OutOfRange { field: "property_price", .. })
        ));

        let at_limit = InstallmentPlan::new(1e308, 0.0, 50.0, 3, 10.0);
        assert_eq!(check_plan(&at_limit, &ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_check_forecast() {
        let ok = ForecastRequest { starting_capital: 9_000_000.0, years: 10, annual_interest_rate: 15.0 };
        assert_eq!(check_forecast(&ok), Ok(()));

        let small = ForecastRequest { starting_capital: 8_999_999.0, ..ok.clone() };
        assert!(matches!(check_forecast(&small), Err(ValidationError::OutOfRange { field: "starting_capital", .. })));
        let none = ForecastRequest { years: 0, ..ok.clone() };
        assert!(matches!(check_forecast(&none), Err(ValidationError::OutOfRange { field: "years", .. })));
        let rate = ForecastRequest { annual_interest_rate: 100.5, ..ok };
        assert!(matches!(check_forecast(&rate), Err(ValidationError::OutOfRange { field: "annual_interest_rate", .. })));
    }

    #[test]
    fn test_forecast_numeric_strings_and_negative_years() {
        let config = ServiceConfig::default();
        let req = validate_forecast_request(r#"{"starting_capital": "9000000", "years": "3"}"#, &config).unwrap();
        assert_eq!(req.years, 3);
        let negative = validate_forecast_request(r#"{"starting_capital": 9000000, "years": -1}"#, &config);
        assert!(matches!(negative, Err(ValidationError::OutOfRange { field: "years", .. })));
    }
}
