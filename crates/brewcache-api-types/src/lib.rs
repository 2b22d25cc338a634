//! Shared request and response types for the Brew Cache content proxy.
//!
//! Content entities mirror the upstream WordPress REST schema. They are
//! read-only snapshots: nothing in this crate writes them back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An HTML fragment as returned by the upstream `{ "rendered": ... }` wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub date: String,
    pub slug: String,
    pub status: String,
    pub title: Rendered,
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub author: u64,
    #[serde(default)]
    pub featured_media: u64,
    #[serde(default)]
    pub categories: Vec<u64>,
    #[serde(default)]
    pub tags: Vec<u64>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<PostEmbeds>,
}

impl Post {
    /// First embedded author, when the upstream expanded it.
    pub fn embedded_author(&self) -> Option<&EmbeddedAuthor> {
        self.embedded.as_ref()?.author.first()
    }

    /// First embedded featured image, when present.
    pub fn featured_image(&self) -> Option<&FeaturedMedia> {
        self.embedded.as_ref()?.featured_media.first()
    }

    /// The category the post is filed under for display purposes.
    pub fn primary_category(&self) -> Option<u64> {
        self.categories.first().copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostEmbeds {
    #[serde(default)]
    pub author: Vec<EmbeddedAuthor>,
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<FeaturedMedia>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedAuthor {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_urls: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedMedia {
    pub id: u64,
    pub source_url: String,
    #[serde(default)]
    pub alt_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_urls: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl Author {
    /// Avatar URL for the requested pixel size (`"24"`, `"48"`, `"96"`).
    pub fn avatar(&self, size: &str) -> Option<&str> {
        self.avatar_urls.as_ref()?.get(size).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: u64,
    pub date: String,
    pub slug: String,
    pub status: String,
    pub title: Rendered,
    pub content: Rendered,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<Rendered>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<u64>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<PageEmbeds>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageEmbeds {
    #[serde(default)]
    pub author: Vec<EmbeddedAuthor>,
}

// ----- Relay payloads -----

/// Contact form body. Fields are optional on the wire so absence surfaces as
/// a validation failure rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub message: String,
}

/// Error body shared by every endpoint: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
