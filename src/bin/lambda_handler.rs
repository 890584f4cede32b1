//! AWS Lambda handler for the installment calculator API
//!
//! Serves schedule, document download and forecast routes through
//! Lambda Function URLs or API Gateway.

use chrono::Utc;
use installment_calc::{
    api::{Api, ApiRequest, ApiResponse},
    config::ServiceConfig,
};
use lambda_http::{run, service_fn, Body, Error, Request, Response};

fn into_response(response: ApiResponse) -> Result<Response<Body>, Error> {
    let mut builder = Response::builder().status(response.status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let body = if response.body.is_empty() {
        Body::Empty
    } else {
        Body::Text(response.body)
    };
    Ok(builder.body(body)?)
}

/// Lambda handler function
async fn handler(api: &Api, event: Request) -> Result<Response<Body>, Error> {
    let body: &[u8] = match event.body() {
        Body::Text(s) => s.as_bytes(),
        Body::Binary(b) => b.as_slice(),
        Body::Empty => &[],
    };
    let origin = event
        .headers()
        .get("origin")
        .and_then(|v| v.to_str().ok());

    let request = ApiRequest {
        method: event.method().as_str(),
        path: event.uri().path(),
        origin,
        body,
        received_at: Utc::now(),
    };

    into_response(api.handle(&request))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = ServiceConfig::from_env();
    log::info!("allowed origins: {:?}", config.allowed_origins);
    let api = Api::new(config);

    run(service_fn(|event: Request| handler(&api, event))).await
}
