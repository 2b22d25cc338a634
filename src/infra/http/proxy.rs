use axum::Json;
use axum::extract::{Query, State};
use serde_json::Value;

use crate::domain::actions::ContentQuery;

use super::HttpState;
use super::error::ApiError;

const SOURCE: &str = "infra::http::proxy";
const INTERNAL_ERROR: &str = "Internal Server Error";

/// `GET /api/wordpress?action=...`
///
/// Repeated parameters resolve to their first occurrence.
pub async fn content(
    State(state): State<HttpState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let first = |name: &str| {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };

    let query = ContentQuery::parse(first("action"), first("slug"), first("categoryId"))
        .map_err(|err| ApiError::bad_request(SOURCE, err.public_message(), err.to_string()))?;

    state
        .proxy
        .execute(&query)
        .await
        .map(Json)
        .map_err(|err| ApiError::internal(SOURCE, INTERNAL_ERROR, &err))
}
