//! Plain-text renderings of the site's blog views.

use std::fmt::Write as _;

use brewcache::util::text::{format_date, strip_html};
use brewcache_api_types::{Author, Category, Page, Post};

const ANONYMOUS: &str = "Anonymous";
const UNCATEGORIZED: &str = "Uncategorized";
const AUTHOR_FALLBACK_BIO: &str = "Passionate about craft beer and sharing brewing knowledge.";

fn date(value: &str) -> String {
    format_date(value).unwrap_or_else(|| value.to_string())
}

fn plain(html: &str) -> String {
    strip_html(html).trim().to_string()
}

fn byline(post: &Post) -> String {
    let author = post
        .embedded_author()
        .map_or(ANONYMOUS, |author| author.name.as_str());
    format!("{author} · {}", date(&post.date))
}

pub fn post_list(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "No articles found.\n".to_string();
    }

    let mut out = String::new();
    for post in posts {
        let _ = writeln!(out, "{}", plain(&post.title.rendered));
        let _ = writeln!(out, "  {}", byline(post));
        let excerpt = plain(&post.excerpt.rendered);
        if !excerpt.is_empty() {
            let _ = writeln!(out, "  {excerpt}");
        }
        let _ = writeln!(out, "  /blogs/{}", post.slug);
        out.push('\n');
    }
    out
}

pub fn post_detail(post: &Post, category: Option<&Category>) -> String {
    let mut out = String::new();
    let category = category.map_or(UNCATEGORIZED, |category| category.name.as_str());
    let _ = writeln!(out, "[{category}]");
    let _ = writeln!(out, "{}", plain(&post.title.rendered));
    let _ = writeln!(out, "{}", byline(post));
    if let Some(image) = post.featured_image() {
        let _ = writeln!(out, "Image: {}", image.source_url);
    }
    out.push('\n');
    let _ = writeln!(out, "{}", plain(&post.content.rendered));
    out
}

pub fn page_detail(page: &Page) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", plain(&page.title.rendered));
    let _ = writeln!(out, "{}", date(&page.date));
    out.push('\n');
    let _ = writeln!(out, "{}", plain(&page.content.rendered));
    out
}

pub fn category_list(categories: &[Category]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{} ({})", category.name, category.slug);
    }
    out
}

pub fn category_posts(category: &Category, posts: &[Post]) -> String {
    let mut out = format!("{}\n\n", category.name);
    out.push_str(&post_list(posts));
    out
}

pub fn author_list(authors: &[Author]) -> String {
    let mut out = String::new();
    for author in authors {
        let bio = author
            .description
            .as_deref()
            .filter(|bio| !bio.trim().is_empty())
            .unwrap_or(AUTHOR_FALLBACK_BIO);
        let _ = writeln!(out, "{}", author.name);
        let _ = writeln!(out, "  {bio}");
        if let Some(avatar) = author.avatar("96") {
            let _ = writeln!(out, "  {avatar}");
        }
    }
    out
}
