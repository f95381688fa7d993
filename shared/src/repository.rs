//! Remote service boundary: request builders and response parsers for the
//! three ride operations. No business rules live here; transport errors and
//! service error bodies are mapped into [`AppError`] kinds and nothing else.

use crate::capabilities::{HttpError, HttpRequest, HttpResponse, HttpResult};
use crate::domain::{
    ApiErrorBody, ConfirmResponse, ConfirmRideRequest, EstimateRequest, HistoryResponse,
    RideEstimate,
};
use crate::AppError;

fn base(url: &str) -> &str {
    url.trim_end_matches('/')
}

pub fn estimate_request(
    base_url: &str,
    request: &EstimateRequest,
) -> Result<HttpRequest, HttpError> {
    HttpRequest::post(format!("{}/ride/estimate", base(base_url)))?.with_json(request)
}

pub fn confirm_request(
    base_url: &str,
    request: &ConfirmRideRequest,
) -> Result<HttpRequest, HttpError> {
    HttpRequest::patch(format!("{}/ride/confirm", base(base_url)))?.with_json(request)
}

pub fn history_request(
    base_url: &str,
    customer_id: &str,
    driver_id: Option<&str>,
) -> Result<HttpRequest, HttpError> {
    let mut url = format!("{}/ride/{customer_id}", base(base_url));
    if let Some(driver_id) = driver_id {
        url.push_str(&format!("?driver_id={driver_id}"));
    }
    HttpRequest::get(url)
}

pub fn parse_estimate(result: &HttpResult) -> Result<RideEstimate, AppError> {
    let response = success_response(result)?;
    response
        .json::<RideEstimate>()
        .map_err(|e| AppError::network(e.to_string()))
}

/// Confirmation is a 2xx with a `{"success": bool}` body; a missing body
/// field counts as confirmed.
pub fn parse_confirmation(result: &HttpResult) -> Result<bool, AppError> {
    let response = success_response(result)?;
    let body = response.json::<ConfirmResponse>().unwrap_or_default();
    Ok(body.success)
}

pub fn parse_history(result: &HttpResult) -> Result<HistoryResponse, AppError> {
    let response = success_response(result)?;
    response
        .json::<HistoryResponse>()
        .map_err(|e| AppError::network(e.to_string()))
}

fn success_response(result: &HttpResult) -> Result<&HttpResponse, AppError> {
    match result {
        Ok(response) if response.is_success() => Ok(response),
        Ok(response) => Err(map_service_error(response)),
        Err(error) => Err(AppError::network(error.to_string())),
    }
}

/// Non-2xx responses carry `{error_code, error_description}`; anything that
/// does not parse becomes a generic unknown error with the status attached.
fn map_service_error(response: &HttpResponse) -> AppError {
    let status = response.status();
    match serde_json::from_slice::<ApiErrorBody>(response.body()) {
        Ok(body) => {
            let description = body
                .error_description
                .or(body.error_code)
                .unwrap_or_else(|| format!("HTTP {status}"));
            AppError::network(format!("{description} (HTTP {status})"))
        }
        Err(_) => AppError::network(format!("unexpected service error (HTTP {status})")),
    }
}
