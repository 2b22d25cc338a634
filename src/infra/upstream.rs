//! Upstream content API adapter (WordPress REST, `/wp-json/wp/v2`).

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, Url, header};
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::sources::{ContentSource, QueryParam, UpstreamError, UpstreamRequest};
use crate::config::UpstreamSettings;

use super::error::InfraError;

#[derive(Clone, Debug)]
pub struct WordPressSource {
    client: Client,
    base_url: Option<Url>,
}

impl WordPressSource {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("brewcache/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Ok(Self::with_client(client, settings.base_url.clone()))
    }

    pub fn with_client(client: Client, base_url: Option<Url>) -> Self {
        Self { client, base_url }
    }

    /// Absolute upstream URL for `request`.
    pub fn url_for(&self, request: &UpstreamRequest) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone().ok_or(UpstreamError::NotConfigured)?;
        url.path_segments_mut()
            .map_err(|()| UpstreamError::NotConfigured)?
            .pop_if_empty()
            .push(request.resource.path_segment());

        if !request.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in &request.params {
                match param {
                    QueryParam::Flag(name) => {
                        pairs.append_key_only(name);
                    }
                    QueryParam::Pair(name, value) => {
                        pairs.append_pair(name, value);
                    }
                }
            }
        }

        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(url)
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| UpstreamError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ContentSource for WordPressSource {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError> {
        let resource = request.resource.path_segment();
        let url = self.url_for(request)?;
        counter!("brewcache_upstream_request_total", "resource" => resource).increment(1);
        debug!(target = "brewcache::upstream", url = %url, "fetching upstream content");

        let result = self.get_json(url).await;
        if let Err(err) = &result {
            counter!(
                "brewcache_upstream_failure_total",
                "resource" => resource,
                "reason" => failure_reason(err)
            )
            .increment(1);
            warn!(
                target = "brewcache::upstream",
                resource,
                error = %err,
                "upstream request failed"
            );
        }
        result
    }
}

fn failure_reason(err: &UpstreamError) -> &'static str {
    match err {
        UpstreamError::NotConfigured => "config",
        UpstreamError::Transport(_) => "transport",
        UpstreamError::Status { .. } => "status",
        UpstreamError::Decode(_) => "decode",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sources::Resource;

    fn source(base: &str) -> WordPressSource {
        WordPressSource::with_client(Client::new(), Some(Url::parse(base).expect("url")))
    }

    #[test]
    fn url_appends_resource_and_params() {
        let source = source("https://cms.example/wp-json/wp/v2/");
        let request = UpstreamRequest::new(Resource::Posts)
            .param("slug", "ipa review")
            .flag("_embed");
        assert_eq!(
            source.url_for(&request).expect("url").as_str(),
            "https://cms.example/wp-json/wp/v2/posts?slug=ipa+review&_embed"
        );
    }

    #[test]
    fn url_without_params_has_no_query() {
        let source = source("https://cms.example/wp-json/wp/v2");
        let url = source
            .url_for(&UpstreamRequest::new(Resource::Categories))
            .expect("url");
        assert_eq!(url.as_str(), "https://cms.example/wp-json/wp/v2/categories");
    }

    #[test]
    fn repeated_roles_are_encoded() {
        let source = source("https://cms.example/wp-json/wp/v2");
        let request = UpstreamRequest::new(Resource::Users)
            .param("roles[]", "author")
            .param("roles[]", "editor");
        let url = source.url_for(&request).expect("url");
        let roles: Vec<_> = url
            .query_pairs()
            .filter(|(key, _)| key == "roles[]")
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(roles, vec!["author", "editor"]);
    }

    #[test]
    fn missing_base_url_is_not_configured() {
        let source = WordPressSource::with_client(Client::new(), None);
        assert!(matches!(
            source.url_for(&UpstreamRequest::new(Resource::Posts)),
            Err(UpstreamError::NotConfigured)
        ));
    }
}
