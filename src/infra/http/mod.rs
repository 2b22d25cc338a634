mod error;
mod middleware;
mod proxy;
mod relay;

pub use error::ApiError;
pub use middleware::{REQUEST_ID_HEADER, RequestContext, Surface};

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::application::{proxy::ContentProxyService, relay::RelayService};

use self::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub proxy: Arc<ContentProxyService>,
    pub relay: Arc<RelayService>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/wordpress", get(proxy::content))
        .route("/api/contact", post(relay::contact))
        .route("/api/subscribe", post(relay::subscribe))
        .route("/_health", get(health))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
