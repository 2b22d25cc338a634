//! Query keys: an operation name plus its parameters.

use std::fmt;

use crate::domain::actions::ContentAction;

/// Identifies one cacheable content query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Posts,
    Post(String),
    Page(String),
    Categories,
    PostsByCategory(u64),
    Authors,
}

impl QueryKey {
    pub fn name(&self) -> &'static str {
        match self {
            QueryKey::Posts => "posts",
            QueryKey::Post(_) => "post",
            QueryKey::Page(_) => "page",
            QueryKey::Categories => "categories",
            QueryKey::PostsByCategory(_) => "postsByCategory",
            QueryKey::Authors => "authors",
        }
    }

    /// Proxy action that answers this query.
    pub fn action(&self) -> ContentAction {
        match self {
            QueryKey::Posts => ContentAction::GetPosts,
            QueryKey::Post(_) => ContentAction::GetPostBySlug,
            QueryKey::Page(_) => ContentAction::GetPageBySlug,
            QueryKey::Categories => ContentAction::GetCategories,
            QueryKey::PostsByCategory(_) => ContentAction::GetPostsByCategory,
            QueryKey::Authors => ContentAction::GetAuthors,
        }
    }

    /// Query-string parameters sent to the proxy alongside `action`.
    pub fn proxy_params(&self) -> Vec<(&'static str, String)> {
        match self {
            QueryKey::Post(slug) | QueryKey::Page(slug) => vec![("slug", slug.clone())],
            QueryKey::PostsByCategory(id) => vec![("categoryId", id.to_string())],
            QueryKey::Posts | QueryKey::Categories | QueryKey::Authors => Vec::new(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[\"{}\"", self.name())?;
        match self {
            QueryKey::Post(slug) | QueryKey::Page(slug) => write!(f, ",\"{slug}\"")?,
            QueryKey::PostsByCategory(id) => write!(f, ",{id}")?,
            QueryKey::Posts | QueryKey::Categories | QueryKey::Authors => {}
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_as_name_and_params() {
        assert_eq!(QueryKey::Posts.to_string(), r#"["posts"]"#);
        assert_eq!(
            QueryKey::Post("ipa-review".into()).to_string(),
            r#"["post","ipa-review"]"#
        );
        assert_eq!(
            QueryKey::PostsByCategory(7).to_string(),
            r#"["postsByCategory",7]"#
        );
    }

    #[test]
    fn same_operation_with_different_params_are_distinct() {
        assert_ne!(QueryKey::Post("a".into()), QueryKey::Post("b".into()));
        assert_ne!(QueryKey::Post("a".into()), QueryKey::Page("a".into()));
    }

    #[test]
    fn proxy_params_follow_action() {
        assert_eq!(
            QueryKey::PostsByCategory(3).proxy_params(),
            vec![("categoryId", "3".to_string())]
        );
        assert_eq!(QueryKey::Page("about".into()).action(), ContentAction::GetPageBySlug);
        assert!(QueryKey::Authors.proxy_params().is_empty());
    }
}
