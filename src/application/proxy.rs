//! Content proxy: maps validated actions onto upstream reads.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::application::sources::{ContentSource, Resource, UpstreamError, UpstreamRequest};
use crate::domain::actions::{ContentAction, ContentQuery};

/// Upper bound the upstream API accepts for `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("upstream returned {found} for `{action}`, expected an array")]
    UnexpectedShape {
        action: ContentAction,
        found: &'static str,
    },
}

/// Query-shaping options for the proxy.
#[derive(Debug, Clone)]
pub struct ProxyOptions {
    pub per_page: u32,
    pub author_roles: Vec<String>,
}

pub struct ContentProxyService {
    source: Arc<dyn ContentSource>,
    options: ProxyOptions,
}

impl ContentProxyService {
    pub fn new(source: Arc<dyn ContentSource>, options: ProxyOptions) -> Self {
        let per_page = options.per_page.clamp(1, MAX_PER_PAGE);
        Self {
            source,
            options: ProxyOptions {
                per_page,
                ..options
            },
        }
    }

    /// Build the upstream request for a validated query.
    pub fn upstream_request(&self, query: &ContentQuery) -> UpstreamRequest {
        let per_page = self.options.per_page.to_string();
        match query {
            ContentQuery::Posts => UpstreamRequest::new(Resource::Posts)
                .flag("_embed")
                .param("per_page", per_page),
            ContentQuery::PostBySlug { slug } => UpstreamRequest::new(Resource::Posts)
                .param("slug", slug.as_str())
                .flag("_embed"),
            ContentQuery::PageBySlug { slug } => UpstreamRequest::new(Resource::Pages)
                .param("slug", slug.as_str())
                .flag("_embed"),
            ContentQuery::Categories => UpstreamRequest::new(Resource::Categories),
            ContentQuery::PostsByCategory { category_id } => {
                UpstreamRequest::new(Resource::Posts)
                    .param("categories", category_id.to_string())
                    .flag("_embed")
            }
            ContentQuery::Authors => self
                .options
                .author_roles
                .iter()
                .fold(UpstreamRequest::new(Resource::Users), |request, role| {
                    request.param("roles[]", role.as_str())
                })
                .param("per_page", per_page),
        }
    }

    /// Run the query against upstream.
    ///
    /// List actions return the upstream array verbatim. Singular lookups
    /// return the first match, or `null` when upstream found nothing.
    pub async fn execute(&self, query: &ContentQuery) -> Result<Value, ProxyError> {
        let request = self.upstream_request(query);
        debug!(
            target = "brewcache::proxy",
            action = %query.action(),
            upstream = %request,
            "forwarding content request"
        );

        let items = match self.source.fetch(&request).await? {
            Value::Array(items) => items,
            other => {
                return Err(ProxyError::UnexpectedShape {
                    action: query.action(),
                    found: json_kind(&other),
                });
            }
        };

        debug!(
            target = "brewcache::proxy",
            action = %query.action(),
            count = items.len(),
            "upstream answered"
        );

        if query.is_singular() {
            Ok(items.into_iter().next().unwrap_or(Value::Null))
        } else {
            Ok(Value::Array(items))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::actions::CategoryId;

    struct StubSource {
        body: Value,
        seen: Mutex<Vec<UpstreamRequest>>,
    }

    impl StubSource {
        fn answering(body: Value) -> Arc<Self> {
            Arc::new(Self {
                body,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<UpstreamRequest> {
            self.seen.lock().expect("stub lock").clone()
        }
    }

    #[async_trait]
    impl ContentSource for StubSource {
        async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError> {
            self.seen.lock().expect("stub lock").push(request.clone());
            Ok(self.body.clone())
        }
    }

    fn options() -> ProxyOptions {
        ProxyOptions {
            per_page: 100,
            author_roles: vec!["author".to_string(), "editor".to_string()],
        }
    }

    #[test]
    fn request_shapes_follow_actions() {
        let service = ContentProxyService::new(StubSource::answering(json!([])), options());
        let slug = "ipa-review".to_string();

        let cases = [
            (ContentQuery::Posts, "/posts?_embed&per_page=100"),
            (
                ContentQuery::PostBySlug { slug: slug.clone() },
                "/posts?slug=ipa-review&_embed",
            ),
            (
                ContentQuery::PageBySlug { slug },
                "/pages?slug=ipa-review&_embed",
            ),
            (ContentQuery::Categories, "/categories"),
            (
                ContentQuery::PostsByCategory {
                    category_id: CategoryId::new(7),
                },
                "/posts?categories=7&_embed",
            ),
            (
                ContentQuery::Authors,
                "/users?roles[]=author&roles[]=editor&per_page=100",
            ),
        ];

        for (query, expected) in cases {
            assert_eq!(service.upstream_request(&query).to_string(), expected);
        }
    }

    #[test]
    fn per_page_is_capped() {
        let service = ContentProxyService::new(
            StubSource::answering(json!([])),
            ProxyOptions {
                per_page: 500,
                ..options()
            },
        );
        let request = service.upstream_request(&ContentQuery::Posts);
        assert_eq!(request.value_of("per_page"), Some("100"));
    }

    #[tokio::test]
    async fn singular_lookup_returns_first_match() {
        let source = StubSource::answering(json!([{"id": 1, "slug": "ipa-review"}]));
        let service = ContentProxyService::new(source.clone(), options());

        let value = service
            .execute(&ContentQuery::PostBySlug {
                slug: "ipa-review".to_string(),
            })
            .await
            .expect("lookup succeeds");

        assert_eq!(value, json!({"id": 1, "slug": "ipa-review"}));
        assert_eq!(source.seen().len(), 1);
    }

    #[tokio::test]
    async fn singular_lookup_without_match_is_null() {
        let service = ContentProxyService::new(StubSource::answering(json!([])), options());
        let value = service
            .execute(&ContentQuery::PageBySlug {
                slug: "does-not-exist".to_string(),
            })
            .await
            .expect("lookup succeeds");
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn list_lookup_passes_array_through() {
        let service = ContentProxyService::new(StubSource::answering(json!([])), options());
        let value = service
            .execute(&ContentQuery::PostsByCategory {
                category_id: CategoryId::new(99),
            })
            .await
            .expect("lookup succeeds");
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn non_array_body_is_rejected() {
        let service = ContentProxyService::new(
            StubSource::answering(json!({"code": "rest_no_route"})),
            options(),
        );
        let err = service
            .execute(&ContentQuery::Categories)
            .await
            .expect_err("object body");
        assert!(matches!(
            err,
            ProxyError::UnexpectedShape {
                found: "an object",
                ..
            }
        ));
    }
}
