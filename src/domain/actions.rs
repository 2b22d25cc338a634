//! Content proxy actions and their validated parameters.
//!
//! The proxy accepts a single `action` discriminator plus operation-specific
//! parameters. Parsing happens here, before any upstream call, so that a
//! malformed request never reaches the content backend.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The fixed set of read operations exposed by the content proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentAction {
    GetPosts,
    GetPostBySlug,
    GetPageBySlug,
    GetCategories,
    GetPostsByCategory,
    GetAuthors,
}

impl ContentAction {
    pub const ALL: [ContentAction; 6] = [
        ContentAction::GetPosts,
        ContentAction::GetPostBySlug,
        ContentAction::GetPageBySlug,
        ContentAction::GetCategories,
        ContentAction::GetPostsByCategory,
        ContentAction::GetAuthors,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentAction::GetPosts => "getPosts",
            ContentAction::GetPostBySlug => "getPostBySlug",
            ContentAction::GetPageBySlug => "getPageBySlug",
            ContentAction::GetCategories => "getCategories",
            ContentAction::GetPostsByCategory => "getPostsByCategory",
            ContentAction::GetAuthors => "getAuthors",
        }
    }
}

impl fmt::Display for ContentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentAction {
    type Err = ContentQueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| ContentQueryError::InvalidAction(Some(value.to_string())))
    }
}

/// Upstream category identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(u64);

impl CategoryId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated proxy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentQuery {
    Posts,
    PostBySlug { slug: String },
    PageBySlug { slug: String },
    Categories,
    PostsByCategory { category_id: CategoryId },
    Authors,
}

impl ContentQuery {
    /// Parse raw query-string values into a validated request.
    pub fn parse(
        action: Option<&str>,
        slug: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<Self, ContentQueryError> {
        let action = action
            .ok_or(ContentQueryError::InvalidAction(None))?
            .parse::<ContentAction>()?;

        match action {
            ContentAction::GetPosts => Ok(Self::Posts),
            ContentAction::GetPostBySlug => Ok(Self::PostBySlug {
                slug: required_slug(slug)?,
            }),
            ContentAction::GetPageBySlug => Ok(Self::PageBySlug {
                slug: required_slug(slug)?,
            }),
            ContentAction::GetCategories => Ok(Self::Categories),
            ContentAction::GetPostsByCategory => {
                let raw = category_id
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .ok_or(ContentQueryError::MissingCategoryId)?;
                let id = raw
                    .parse::<u64>()
                    .map_err(|_| ContentQueryError::InvalidCategoryId(raw.to_string()))?;
                Ok(Self::PostsByCategory {
                    category_id: CategoryId::new(id),
                })
            }
            ContentAction::GetAuthors => Ok(Self::Authors),
        }
    }

    pub fn action(&self) -> ContentAction {
        match self {
            ContentQuery::Posts => ContentAction::GetPosts,
            ContentQuery::PostBySlug { .. } => ContentAction::GetPostBySlug,
            ContentQuery::PageBySlug { .. } => ContentAction::GetPageBySlug,
            ContentQuery::Categories => ContentAction::GetCategories,
            ContentQuery::PostsByCategory { .. } => ContentAction::GetPostsByCategory,
            ContentQuery::Authors => ContentAction::GetAuthors,
        }
    }

    /// Singular lookups answer with at most one entity.
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            ContentQuery::PostBySlug { .. } | ContentQuery::PageBySlug { .. }
        )
    }
}

fn required_slug(slug: Option<&str>) -> Result<String, ContentQueryError> {
    slug.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(ContentQueryError::MissingSlug)
}

/// Client-caused proxy request errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentQueryError {
    #[error("unknown or missing action {0:?}")]
    InvalidAction(Option<String>),
    #[error("slug parameter is required")]
    MissingSlug,
    #[error("categoryId parameter is required")]
    MissingCategoryId,
    #[error("categoryId `{0}` is not a number")]
    InvalidCategoryId(String),
}

impl ContentQueryError {
    /// Message safe to return to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            ContentQueryError::InvalidAction(_) => "Invalid action",
            ContentQueryError::MissingSlug => "Slug required",
            ContentQueryError::MissingCategoryId => "Category ID required",
            ContentQueryError::InvalidCategoryId(_) => "Category ID must be numeric",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_round_trip() {
        for action in ContentAction::ALL {
            assert_eq!(action.as_str().parse::<ContentAction>(), Ok(action));
        }
    }

    #[test]
    fn action_names_are_case_sensitive() {
        assert!("getposts".parse::<ContentAction>().is_err());
    }

    #[test]
    fn missing_action_is_invalid() {
        let err = ContentQuery::parse(None, Some("ipa"), None).expect_err("no action");
        assert_eq!(err, ContentQueryError::InvalidAction(None));
        assert_eq!(err.public_message(), "Invalid action");
    }

    #[test]
    fn unknown_action_is_invalid() {
        let err = ContentQuery::parse(Some("deletePosts"), None, None).expect_err("unknown");
        assert_eq!(
            err,
            ContentQueryError::InvalidAction(Some("deletePosts".to_string()))
        );
    }

    #[test]
    fn slug_lookups_require_a_slug() {
        for action in ["getPostBySlug", "getPageBySlug"] {
            assert_eq!(
                ContentQuery::parse(Some(action), None, None),
                Err(ContentQueryError::MissingSlug)
            );
            assert_eq!(
                ContentQuery::parse(Some(action), Some("   "), None),
                Err(ContentQueryError::MissingSlug)
            );
        }
    }

    #[test]
    fn slug_is_trimmed() {
        let query = ContentQuery::parse(Some("getPostBySlug"), Some(" ipa-review "), None)
            .expect("valid query");
        assert_eq!(
            query,
            ContentQuery::PostBySlug {
                slug: "ipa-review".to_string()
            }
        );
        assert!(query.is_singular());
    }

    #[test]
    fn category_lookup_requires_numeric_id() {
        assert_eq!(
            ContentQuery::parse(Some("getPostsByCategory"), None, None),
            Err(ContentQueryError::MissingCategoryId)
        );
        assert_eq!(
            ContentQuery::parse(Some("getPostsByCategory"), None, Some("stouts")),
            Err(ContentQueryError::InvalidCategoryId("stouts".to_string()))
        );

        let query = ContentQuery::parse(Some("getPostsByCategory"), None, Some("7"))
            .expect("valid query");
        assert_eq!(
            query,
            ContentQuery::PostsByCategory {
                category_id: CategoryId::new(7)
            }
        );
        assert!(!query.is_singular());
    }

    #[test]
    fn parameterless_actions_ignore_extra_params() {
        let query = ContentQuery::parse(Some("getAuthors"), Some("ignored"), Some("x"))
            .expect("valid query");
        assert_eq!(query, ContentQuery::Authors);
        assert_eq!(query.action(), ContentAction::GetAuthors);
    }
}
