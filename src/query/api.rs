//! HTTP access to the content proxy.

use std::time::Duration;

use brewcache_api_types::ErrorBody;
use reqwest::{Client, Url, header};
use serde_json::Value;
use tracing::debug;

use super::error::QueryError;
use crate::cache::QueryKey;

const PROXY_PATH: &str = "/api/wordpress";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ContentApi {
    client: Client,
    endpoint: Url,
}

impl ContentApi {
    /// Build a client for the site rooted at `site` (e.g. `https://brewcache.example`).
    pub fn new(site: &str) -> Result<Self, QueryError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Self::with_client(client, site)
    }

    pub fn with_client(client: Client, site: &str) -> Result<Self, QueryError> {
        let endpoint = Url::parse(site)?.join(PROXY_PATH)?;
        Ok(Self { client, endpoint })
    }

    pub fn user_agent() -> &'static str {
        concat!("brewcache/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Proxy URL answering `key`.
    pub fn url_for(&self, key: &QueryKey) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("action", key.action().as_str());
            for (name, value) in key.proxy_params() {
                pairs.append_pair(name, &value);
            }
        }
        url
    }

    pub async fn fetch(&self, key: &QueryKey) -> Result<Value, QueryError> {
        let url = self.url_for(key);
        debug!(target = "brewcache::query", key = %key, url = %url, "requesting content");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| QueryError::Transport(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| QueryError::Transport(err.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.error)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                });
            return Err(QueryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| QueryError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_carry_action_and_params() {
        let api = ContentApi::new("https://brewcache.example/blogs").expect("api");
        assert_eq!(
            api.url_for(&QueryKey::Post("ipa review".into())).as_str(),
            "https://brewcache.example/api/wordpress?action=getPostBySlug&slug=ipa+review"
        );
        assert_eq!(
            api.url_for(&QueryKey::PostsByCategory(4)).as_str(),
            "https://brewcache.example/api/wordpress?action=getPostsByCategory&categoryId=4"
        );
        assert_eq!(
            api.url_for(&QueryKey::Authors).as_str(),
            "https://brewcache.example/api/wordpress?action=getAuthors"
        );
    }

    #[test]
    fn invalid_site_is_rejected() {
        assert!(matches!(
            ContentApi::new("not a url"),
            Err(QueryError::Url(_))
        ));
    }
}
