use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use brewcache_api_types::{ContactRequest, RelayResponse, SubscribeRequest};
use serde::de::DeserializeOwned;

use crate::application::relay::RelayError;
use crate::domain::error::DomainError;

use super::HttpState;
use super::error::ApiError;

const SOURCE: &str = "infra::http::relay";

/// A body that does not decode is treated as an empty submission, so it
/// fails the same field validation as a form with nothing filled in.
fn submission<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

const INVALID_EMAIL: &str = "Valid email is required";

fn relay_error(err: RelayError, invalid: &'static str, failed: &'static str) -> ApiError {
    match err {
        RelayError::Validation(err @ DomainError::InvalidEmail { .. }) => {
            ApiError::bad_request(SOURCE, INVALID_EMAIL, err.to_string())
        }
        RelayError::Validation(err) => ApiError::bad_request(SOURCE, invalid, err.to_string()),
        RelayError::Mail(err) => ApiError::internal(SOURCE, failed, &err),
    }
}

/// `POST /api/contact`
pub async fn contact(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    let request: ContactRequest = submission(&body);
    state
        .relay
        .contact(request)
        .await
        .map_err(|err| relay_error(err, "All fields are required", "Failed to send email"))?;

    Ok(Json(RelayResponse {
        message: "Email sent successfully".to_string(),
    }))
}

/// `POST /api/subscribe`
pub async fn subscribe(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    let request: SubscribeRequest = submission(&body);
    state.relay.subscribe(request).await.map_err(|err| {
        relay_error(err, INVALID_EMAIL, "Failed to process subscription")
    })?;

    Ok(Json(RelayResponse {
        message: "Subscription request sent successfully".to_string(),
    }))
}
