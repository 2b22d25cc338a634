//! Typed content queries over the proxy, shared through one query client.

use std::sync::Arc;

use brewcache_api_types::{Author, Category, Page, Post};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::api::ContentApi;
use super::client::QueryClient;
use super::error::QueryError;
use super::state::QueryState;
use crate::cache::{CacheConfig, MemoryQueryCache, QueryCache, QueryKey};

/// Process-wide query context: one proxy client and one query cache.
#[derive(Clone)]
pub struct ContentQueries {
    api: ContentApi,
    client: Arc<QueryClient>,
}

impl ContentQueries {
    pub fn new(api: ContentApi, config: CacheConfig) -> Self {
        Self::with_cache(api, Arc::new(MemoryQueryCache::new()), config)
    }

    pub fn with_cache(api: ContentApi, cache: Arc<dyn QueryCache>, config: CacheConfig) -> Self {
        Self {
            api,
            client: Arc::new(QueryClient::new(cache, config)),
        }
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub async fn posts(&self) -> Result<Vec<Post>, QueryError> {
        self.typed(QueryKey::Posts).await
    }

    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, QueryError> {
        self.typed(QueryKey::Post(slug.to_string())).await
    }

    pub async fn page_by_slug(&self, slug: &str) -> Result<Option<Page>, QueryError> {
        self.typed(QueryKey::Page(slug.to_string())).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, QueryError> {
        self.typed(QueryKey::Categories).await
    }

    pub async fn posts_by_category(&self, category_id: u64) -> Result<Vec<Post>, QueryError> {
        self.typed(QueryKey::PostsByCategory(category_id)).await
    }

    pub async fn authors(&self) -> Result<Vec<Author>, QueryError> {
        self.typed(QueryKey::Authors).await
    }

    /// First category whose slug matches, found in the cached category list.
    pub async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, QueryError> {
        let categories = self.categories().await?;
        Ok(categories.into_iter().find(|category| category.slug == slug))
    }

    /// Category a post is filed under: its first category id, looked up in the category list.
    pub async fn category_of(&self, post: &Post) -> Result<Option<Category>, QueryError> {
        let Some(id) = post.primary_category() else {
            return Ok(None);
        };
        let categories = self.categories().await?;
        Ok(categories.into_iter().find(|category| category.id == id))
    }

    /// View-facing variant of any typed query.
    pub async fn state<T, F, Fut>(&self, query: F) -> QueryState<T>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        query(self.clone()).await.into()
    }

    async fn raw(&self, key: QueryKey) -> Result<Value, QueryError> {
        let api = self.api.clone();
        let request_key = key.clone();
        self.client
            .fetch_query(key, move || async move { api.fetch(&request_key).await })
            .await
    }

    async fn typed<T: DeserializeOwned>(&self, key: QueryKey) -> Result<T, QueryError> {
        let value = self.raw(key).await?;
        serde_json::from_value(value).map_err(|err| QueryError::Decode(err.to_string()))
    }
}
