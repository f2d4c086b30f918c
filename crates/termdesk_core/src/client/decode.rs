//! Status/body decoding shared by every transport.

use super::{ApiError, ApiResult};
use crate::model::contract_term::FieldErrors;
use crate::wire::{ApiResponse, ErrorBody};
use http::StatusCode;
use serde::de::DeserializeOwned;

/// Decodes a success body as JSON, or maps the failure status.
pub(super) fn json_body<T: DeserializeOwned>(response: &ApiResponse) -> ApiResult<T> {
    if !response.status.is_success() {
        return Err(failure(response));
    }
    serde_json::from_str(response.body_str()).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Accepts any success status and ignores the body.
pub(super) fn no_content(response: &ApiResponse) -> ApiResult<()> {
    if response.status.is_success() {
        Ok(())
    } else {
        Err(failure(response))
    }
}

fn failure(response: &ApiResponse) -> ApiError {
    match response.status {
        StatusCode::UNPROCESSABLE_ENTITY => {
            match serde_json::from_str::<FieldErrors>(response.body_str()) {
                Ok(errors) if !errors.is_empty() => ApiError::Validation(errors),
                _ => rejected(response),
            }
        }
        StatusCode::NOT_FOUND => ApiError::NotFound(server_message(response)),
        _ => rejected(response),
    }
}

fn rejected(response: &ApiResponse) -> ApiError {
    ApiError::Rejected {
        status: response.status,
        message: server_message(response),
    }
}

/// Raw server message: the `error` field when present, else the whole body,
/// else the status reason phrase.
fn server_message(response: &ApiResponse) -> String {
    let body = response.body_str().trim();
    if body.is_empty() {
        return response
            .status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.to_string(),
    }
}
