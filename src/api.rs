//! HTTP routing independent of the hosting runtime
//!
//! The Lambda binary converts its events into `ApiRequest` and the result
//! back; everything else (validation, status codes, CORS, bodies) lives here.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::document::{ScheduleDocument, DOCUMENT_CONTENT_TYPE, DOCUMENT_FILE_NAME};
use crate::error::{CalcError, ValidationError};
use crate::forecast::generate_investment_forecast;
use crate::money::round_cents;
use crate::schedule::{PaymentLineItem, ScheduleConfig, ScheduleGenerator};
use crate::validation::{validate_forecast_request, validate_schedule_request, ScheduleRequest};

pub const SCHEDULE_PATH: &str = "/api/calculate_payment_schedule";
pub const DOWNLOAD_PATH: &str = "/api/download_payment_schedule";
pub const LEGACY_DOWNLOAD_PATH: &str = "/api/download_pdf_payment_schedule";
pub const FORECAST_PATH: &str = "/api/calculate_investment_forecast";
pub const HEALTH_PATH: &str = "/api/health";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Incoming request, already stripped of transport details
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub origin: Option<&'a str>,
    /// Raw body bytes; decoded as UTF-8 by the routes that read it
    pub body: &'a [u8],
    /// Wall-clock time of the request; the only source of "now"
    pub received_at: DateTime<Utc>,
}

impl ApiRequest<'_> {
    /// Body as text. Invalid UTF-8 is rejected rather than patched up.
    pub fn text(&self) -> Result<&str, ValidationError> {
        std::str::from_utf8(self.body)
            .map_err(|e| ValidationError::MalformedJson(format!("body is not valid UTF-8: {}", e)))
    }
}

/// Outgoing response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Serialize)]
struct ScheduleResponse<'a> {
    payment_schedule: &'a [PaymentLineItem],
    total_cost: f64,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

enum Route {
    Preflight,
    Health,
    Schedule,
    Download,
    Forecast,
    MethodNotAllowed,
    NotFound,
}

fn route(method: &str, path: &str) -> Route {
    let path = path.trim_end_matches('/');
    if method.eq_ignore_ascii_case("OPTIONS") {
        return Route::Preflight;
    }
    let is_post = method.eq_ignore_ascii_case("POST");
    let is_get = method.eq_ignore_ascii_case("GET");

    match path {
        HEALTH_PATH if is_get => Route::Health,
        SCHEDULE_PATH if is_post => Route::Schedule,
        DOWNLOAD_PATH | LEGACY_DOWNLOAD_PATH if is_post => Route::Download,
        FORECAST_PATH if is_post => Route::Forecast,
        HEALTH_PATH | SCHEDULE_PATH | DOWNLOAD_PATH | LEGACY_DOWNLOAD_PATH | FORECAST_PATH => {
            Route::MethodNotAllowed
        }
        _ => Route::NotFound,
    }
}

/// Request router holding the service configuration
#[derive(Debug, Clone)]
pub struct Api {
    config: ServiceConfig,
}

impl Api {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Handle one request. Never fails; every outcome is a response.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        log::info!("{} {}", request.method, request.path);

        let result = match route(request.method, request.path) {
            Route::Preflight => Ok(self.respond(request, 200, None, String::new())),
            Route::Health => self.json(request, 200, &serde_json::json!({ "status": "ok" })),
            Route::Schedule => self.calculate_schedule(request),
            Route::Download => self.download_schedule(request),
            Route::Forecast => self.calculate_forecast(request),
            Route::MethodNotAllowed => Ok(self.error(request, 405, "method not allowed")),
            Route::NotFound => Ok(self.error(request, 404, "not found")),
        };

        result.unwrap_or_else(|e| match e {
            HandlerError::Invalid(e) => {
                log::warn!("rejected {}: {}", request.path, e);
                self.error(request, 400, &e.to_string())
            }
            HandlerError::Internal(e) => {
                log::error!("internal error on {}: {}", request.path, e);
                self.error(request, 500, "internal server error")
            }
        })
    }

    /// Local wall-clock time in the configured offset
    fn local_now(&self, request: &ApiRequest) -> NaiveDateTime {
        request.received_at.naive_utc()
            + Duration::hours(self.config.document_utc_offset_hours as i64)
    }

    fn schedule_request(
        &self,
        request: &ApiRequest,
        require_apartment: bool,
    ) -> Result<ScheduleRequest, ValidationError> {
        let today = self.local_now(request).date();
        validate_schedule_request(request.text()?, &self.config, today, require_apartment)
    }

    fn calculate_schedule(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let req = self.schedule_request(request, false)?;
        let schedule = ScheduleGenerator::new(ScheduleConfig::new(req.start_date).with_locale(req.locale))
            .generate(&req.plan)?;

        log::debug!(
            "schedule: {} rows, total cost {:.2}, drift {:.2}",
            schedule.len(),
            schedule.total_cost,
            schedule.rounding_drift()
        );

        self.json(request, 200, &ScheduleResponse {
            payment_schedule: &schedule.payment_schedule,
            total_cost: round_cents(schedule.total_cost),
        })
    }

    fn download_schedule(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let req = self.schedule_request(request, true)?;
        let schedule = ScheduleGenerator::new(ScheduleConfig::new(req.start_date).with_locale(req.locale))
            .generate(&req.plan)?;

        let document = ScheduleDocument {
            apartment_number: req.apartment_number.unwrap_or_default(),
            property_price: req.plan.property_price,
            installment_period: req.plan.installment_period,
            generated_at: self.local_now(request),
            locale: req.locale,
        };
        let body = document.render_string(&schedule)?;

        let mut response = self.respond(request, 200, Some(DOCUMENT_CONTENT_TYPE), body);
        response.headers.push((
            "Content-Disposition".to_string(),
            format!("attachment; filename=\"{}\"", DOCUMENT_FILE_NAME),
        ));
        Ok(response)
    }

    fn calculate_forecast(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        let req = validate_forecast_request(request.text()?, &self.config)?;
        let forecast = generate_investment_forecast(
            req.starting_capital,
            req.years,
            req.annual_interest_rate,
        );
        self.json(request, 200, &forecast)
    }

    fn json<T: Serialize>(
        &self,
        request: &ApiRequest,
        status: u16,
        body: &T,
    ) -> Result<ApiResponse, HandlerError> {
        let text = serde_json::to_string(body)
            .map_err(|e| HandlerError::Internal(CalcError::Encoding(e.to_string())))?;
        Ok(self.respond(request, status, Some(JSON_CONTENT_TYPE), text))
    }

    fn error(&self, request: &ApiRequest, status: u16, message: &str) -> ApiResponse {
        // Serialising a single string field cannot fail
        let body = serde_json::to_string(&ErrorResponse { error: message })
            .unwrap_or_else(|_| String::from("{\"error\":\"internal server error\"}"));
        self.respond(request, status, Some(JSON_CONTENT_TYPE), body)
    }

    fn respond(
        &self,
        request: &ApiRequest,
        status: u16,
        content_type: Option<&str>,
        body: String,
    ) -> ApiResponse {
        let mut headers = vec![
            (
                "Access-Control-Allow-Origin".to_string(),
                self.config.cors_origin(request.origin),
            ),
            (
                "Access-Control-Allow-Methods".to_string(),
                "GET, POST, OPTIONS".to_string(),
            ),
            (
                "Access-Control-Allow-Headers".to_string(),
                "Content-Type, Authorization".to_string(),
            ),
            (
                "Access-Control-Expose-Headers".to_string(),
                "Content-Disposition".to_string(),
            ),
            ("Vary".to_string(), "Origin".to_string()),
        ];
        if let Some(content_type) = content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        ApiResponse { status, headers, body }
    }
}

enum HandlerError {
    Invalid(ValidationError),
    Internal(CalcError),
}

impl From<ValidationError> for HandlerError {
    fn from(e: ValidationError) -> Self {
        HandlerError::Invalid(e)
    }
}

impl From<CalcError> for HandlerError {
    fn from(e: CalcError) -> Self {
        HandlerError::Internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn api() -> Api {
        Api::new(ServiceConfig::default())
    }

    fn call(method: &str, path: &str, body: &str) -> ApiResponse {
        let request = ApiRequest {
            method,
            path,
            origin: Some("https://tamerun-invest.ru"),
            body: body.as_bytes(),
            // 22:30 UTC is already the next day at UTC+3
            received_at: Utc.with_ymd_and_hms(2025, 7, 31, 22, 30, 0).unwrap(),
        };
        api().handle(&request)
    }

    fn json_body(response: &ApiResponse) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    const SCHEDULE_BODY: &str = r#"{
        "property_price": 1000,
        "installment_percentage": 10,
        "initial_payment_percentage": 50,
        "installment_period": 3,
        "monthly_payment_percentage": 10
    }"#;

    #[test]
    fn test_schedule_endpoint() {
        let response = call("POST", SCHEDULE_PATH, SCHEDULE_BODY);
        assert_eq!(response.status, 200);
        assert_eq!(response.header("content-type"), Some("application/json"));

        let body = json_body(&response);
        assert_eq!(body["total_cost"], 1100.0);
        let rows = body["payment_schedule"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["amount"], 550);
        assert_eq!(rows[1]["amount"], 110);
        assert_eq!(rows[2]["amount"], 440);
        assert_eq!(rows[0]["onetime_payment"], true);
        assert_eq!(rows[2]["kind"], "closing");
        // no explicit date: today at UTC+3
        assert_eq!(rows[0]["date"], "авг. 2025");
    }

    #[test]
    fn test_forecast_endpoint() {
        let response = call("POST", FORECAST_PATH, r#"{"starting_capital": 9000000, "years": 2, "annual_interest_rate": 10}"#);
        assert_eq!(response.status, 200);

        let body = json_body(&response);
        assert_eq!(body["total_amount"], 10_890_000.0);
        assert_eq!(body["profit"], 1_890_000.0);
        assert_eq!(body["yearly_details"][1]["start_amount"], 9_900_000.0);
        assert_eq!(body["yearly_details"][1]["year"], 2);
    }

    #[test]
    fn test_forecast_default_rate() {
        let response = call("POST", FORECAST_PATH, r#"{"starting_capital": 9000000, "years": 1}"#);
        assert_eq!(json_body(&response)["total_amount"], 10_350_000.0);
    }

    #[test]
    fn test_download_endpoint() {
        let body = SCHEDULE_BODY.replace("\"installment_period\": 3", "\"installment_period\": 3, \"apartment_number\": 7");
        let response = call("POST", DOWNLOAD_PATH, &body);
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some(DOCUMENT_CONTENT_TYPE));
        assert_eq!(
            response.header("Content-Disposition"),
            Some("attachment; filename=\"payment_schedule.csv\"")
        );
        assert!(response.body.contains("Апартаменты № 7"));
        assert!(response.body.contains("01.08.2025 01:30:00"));

        let legacy = call("POST", LEGACY_DOWNLOAD_PATH, &body);
        assert_eq!(legacy.status, 200);
    }

    #[test]
    fn test_download_requires_apartment() {
        let response = call("POST", DOWNLOAD_PATH, SCHEDULE_BODY);
        assert_eq!(response.status, 400);
        assert!(json_body(&response)["error"].as_str().unwrap().contains("apartment_number"));
    }

    #[test]
    fn test_validation_errors_are_400() {
        let response = call("POST", SCHEDULE_PATH, "");
        assert_eq!(response.status, 400);
        let response = call("POST", FORECAST_PATH, r#"{"starting_capital": 5, "years": 1}"#);
        assert_eq!(response.status, 400);
        assert!(json_body(&response)["error"].as_str().unwrap().contains("starting_capital"));
    }

    #[test]
    fn test_routing_statuses() {
        assert_eq!(call("GET", SCHEDULE_PATH, "").status, 405);
        assert_eq!(call("POST", "/api/unknown", "{}").status, 404);
        assert_eq!(call("GET", HEALTH_PATH, "").status, 200);
        assert_eq!(call("POST", "/api/calculate_payment_schedule/", SCHEDULE_BODY).status, 200);

        let preflight = call("OPTIONS", SCHEDULE_PATH, "");
        assert_eq!(preflight.status, 200);
        assert!(preflight.body.is_empty());
        assert_eq!(preflight.header("Access-Control-Allow-Origin"), Some("https://tamerun-invest.ru"));
    }

    #[test]
    fn test_cors_on_errors() {
        let response = call("POST", "/api/unknown", "{}");
        assert_eq!(response.header("Access-Control-Expose-Headers"), Some("Content-Disposition"));
        assert!(response.header("Access-Control-Allow-Origin").is_some());
    }

    #[test]
    fn test_overflowing_price_is_400() {
        let body = SCHEDULE_BODY
            .replace("\"property_price\": 1000", "\"property_price\": 1e308")
            .replace("\"installment_percentage\": 10", "\"installment_percentage\": 100");
        let response = call("POST", SCHEDULE_PATH, &body);
        assert_eq!(response.status, 400);
        assert!(json_body(&response)["error"].as_str().unwrap().contains("property_price"));
    }

    #[test]
    fn test_invalid_utf8_body_is_400() {
        let request = ApiRequest {
            method: "POST",
            path: FORECAST_PATH,
            origin: None,
            body: b"{\"starting_capital\": 9000000, \"years\": \xff}",
            received_at: Utc.with_ymd_and_hms(2025, 7, 31, 22, 30, 0).unwrap(),
        };
        let response = api().handle(&request);
        assert_eq!(response.status, 400);
        assert!(json_body(&response)["error"].as_str().unwrap().contains("UTF-8"));
    }
}
