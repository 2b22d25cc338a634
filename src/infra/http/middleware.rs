use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Which public surface a request hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Surface {
    /// `/api/wordpress`, with the first `action` value when one was given.
    Content { action: Option<String> },
    Contact,
    Subscribe,
    Health,
    Other,
}

impl Surface {
    pub fn classify(path: &str, query: Option<&str>) -> Self {
        match path {
            "/api/wordpress" => Surface::Content {
                action: query.and_then(|query| {
                    url::form_urlencoded::parse(query.as_bytes())
                        .find(|(name, _)| name == "action")
                        .map(|(_, value)| value.into_owned())
                }),
            },
            "/api/contact" => Surface::Contact,
            "/api/subscribe" => Surface::Subscribe,
            "/_health" => Surface::Health,
            _ => Surface::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Surface::Content { .. } => "content",
            Surface::Contact => "contact",
            Surface::Subscribe => "subscribe",
            Surface::Health => "health",
            Surface::Other => "other",
        }
    }

    fn action(&self) -> &str {
        match self {
            Surface::Content {
                action: Some(action),
            } => action,
            _ => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub surface: Surface,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
        surface: Surface::classify(request.uri().path(), request.uri().query()),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(|| RequestContext {
            request_id: String::new(),
            surface: Surface::classify(&path, request.uri().query()),
        });

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    let class = match status.as_u16() {
        500.. => "5xx",
        400..=499 => "4xx",
        _ => "ok",
    };
    counter!(
        "brewcache_http_response_total",
        "surface" => ctx.surface.label(),
        "class" => class
    )
    .increment(1);

    if !(status.is_client_error() || status.is_server_error()) {
        debug!(
            target = "brewcache::http::response",
            status = status.as_u16(),
            surface = ctx.surface.label(),
            action = ctx.surface.action(),
            elapsed_ms = elapsed_ms,
            request_id = %ctx.request_id,
            "request served",
        );
        return response;
    }

    let report = response.extensions_mut().remove::<ErrorReport>();
    let (source, messages) = match report {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = messages
        .first()
        .cloned()
        .unwrap_or_else(|| "no diagnostic available".to_string());

    if status.is_server_error() {
        error!(
            target = "brewcache::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            surface = ctx.surface.label(),
            action = ctx.surface.action(),
            elapsed_ms = elapsed_ms,
            source = source,
            detail = %detail,
            chain = ?messages,
            request_id = %ctx.request_id,
            "request failed",
        );
    } else {
        warn!(
            target = "brewcache::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            surface = ctx.surface.label(),
            action = ctx.surface.action(),
            elapsed_ms = elapsed_ms,
            source = source,
            detail = %detail,
            request_id = %ctx.request_id,
            "rejected request",
        );
    }

    response
}
