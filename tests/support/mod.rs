#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use brewcache::application::{
    proxy::{ContentProxyService, ProxyOptions},
    relay::RelayService,
    sources::{ContentSource, MailError, Mailer, OutboundMail, UpstreamError, UpstreamRequest},
};
use brewcache::infra::http::{HttpState, build_router};
use serde_json::Value;
use tower::ServiceExt;

/// Upstream double answering every request with one canned result.
pub struct FakeSource {
    answer: Mutex<Result<Value, u16>>,
    seen: Mutex<Vec<UpstreamRequest>>,
}

impl FakeSource {
    pub fn answering(body: Value) -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new(Ok(body)),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new(Err(status)),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<UpstreamRequest> {
        self.seen.lock().expect("fake source lock").clone()
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError> {
        self.seen
            .lock()
            .expect("fake source lock")
            .push(request.clone());
        self.answer
            .lock()
            .expect("fake source lock")
            .clone()
            .map_err(|status| UpstreamError::Status { status })
    }
}

/// Mailer double recording what would have been sent.
#[derive(Default)]
pub struct RecordingMailer {
    pub fail: bool,
    sent: Mutex<Vec<OutboundMail>>,
}

impl RecordingMailer {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("535 authentication failed".into()));
        }
        self.sent.lock().expect("mailer lock").push(mail);
        Ok(())
    }
}

pub fn app(source: Arc<FakeSource>, mailer: Arc<RecordingMailer>) -> Router {
    let proxy = ContentProxyService::new(
        source,
        ProxyOptions {
            per_page: 100,
            author_roles: vec!["author".into(), "editor".into()],
        },
    );
    let relay = RelayService::new(mailer, "Brew Cache");
    build_router(HttpState {
        proxy: Arc::new(proxy),
        relay: Arc::new(relay),
    })
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}
