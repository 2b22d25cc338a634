//! Traits describing the outbound adapters: the upstream content API and the
//! mail relay.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Upstream collections reachable through the content API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Posts,
    Pages,
    Categories,
    Users,
}

impl Resource {
    pub fn path_segment(self) -> &'static str {
        match self {
            Resource::Posts => "posts",
            Resource::Pages => "pages",
            Resource::Categories => "categories",
            Resource::Users => "users",
        }
    }
}

/// A single upstream query parameter. Flags (such as `_embed`) carry no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Flag(&'static str),
    Pair(&'static str, String),
}

/// A read-only request against the upstream content API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub resource: Resource,
    pub params: Vec<QueryParam>,
}

impl UpstreamRequest {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            params: Vec::new(),
        }
    }

    pub fn flag(mut self, name: &'static str) -> Self {
        self.params.push(QueryParam::Flag(name));
        self
    }

    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push(QueryParam::Pair(name, value.into()));
        self
    }

    /// Value of the first pair parameter with the given name.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.params.iter().find_map(|param| match param {
            QueryParam::Pair(key, value) if *key == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.params
            .iter()
            .any(|param| matches!(param, QueryParam::Flag(key) if *key == name))
    }
}

impl fmt::Display for UpstreamRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.resource.path_segment())?;
        for (index, param) in self.params.iter().enumerate() {
            let sep = if index == 0 { '?' } else { '&' };
            match param {
                QueryParam::Flag(name) => write!(f, "{sep}{name}")?,
                QueryParam::Pair(name, value) => write!(f, "{sep}{name}={value}")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream content API base URL is not configured")]
    NotConfigured,
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream responded with status {status}")]
    Status { status: u16 },
    #[error("upstream body could not be decoded: {0}")]
    Decode(String),
}

/// Source of upstream content JSON.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError>;
}

/// A message addressed to the site operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub reply_to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail account credentials are not configured")]
    NotConfigured,
    #[error("invalid mail address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("failed to render message body: {0}")]
    Render(String),
    #[error("mail relay rejected message: {0}")]
    Transport(String),
}

/// Delivers operator notifications through an external relay.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError>;
}
