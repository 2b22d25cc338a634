//! brewcache-cli: terminal reader for the Brew Cache chronicle.
//! Every command goes through the cached query layer, the same way the site's views do.

mod args;
mod views;


use std::time::Duration;

use brewcache::cache::CacheConfig;
use brewcache::query::{ContentApi, ContentQueries, QueryError};
use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use args::{Cli, Commands};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("site URL is required (use --site or BREWCACHE_SITE_URL)")]
    MissingSite,
    #[error("{0}")]
    Query(#[from] QueryError),
    #[error("{kind} `{slug}` not found")]
    NotFound { kind: &'static str, slug: String },
    #[error("failed to render output: {0}")]
    Render(String),
}

pub fn build_queries(cli: &Cli) -> Result<ContentQueries, CliError> {
    let site = cli.site.as_deref().ok_or(CliError::MissingSite)?;
    let api = ContentApi::new(site)?;
    Ok(ContentQueries::new(
        api,
        CacheConfig::with_stale_time(Duration::from_secs(cli.stale_seconds)),
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| CliError::Render(e.to_string()))?;
    println!("{out}");
    Ok(())
}

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    view: impl FnOnce(&T) -> String,
) -> Result<(), CliError> {
    if json {
        print_json(value)
    } else {
        print!("{}", view(value));
        Ok(())
    }
}

pub async fn handle(
    queries: &ContentQueries,
    command: Commands,
    json: bool,
) -> Result<(), CliError> {
    match command {
        Commands::Posts => {
            let posts = queries.posts().await?;
            emit(json, &posts, |posts| views::post_list(posts))
        }
        Commands::Post { slug } => {
            let post = queries
                .post_by_slug(&slug)
                .await?
                .ok_or(CliError::NotFound { kind: "post", slug })?;
            if json {
                return print_json(&post);
            }
            let category = queries.category_of(&post).await?;
            print!("{}", views::post_detail(&post, category.as_ref()));
            Ok(())
        }
        Commands::Page { slug } => {
            let page = queries
                .page_by_slug(&slug)
                .await?
                .ok_or(CliError::NotFound { kind: "page", slug })?;
            emit(json, &page, views::page_detail)
        }
        Commands::Categories => {
            let categories = queries.categories().await?;
            emit(json, &categories, |categories| views::category_list(categories))
        }
        Commands::Category { slug } => {
            let category = queries
                .category_by_slug(&slug)
                .await?
                .ok_or(CliError::NotFound {
                    kind: "category",
                    slug,
                })?;
            let posts = queries.posts_by_category(category.id).await?;
            emit(json, &posts, |posts| views::category_posts(&category, posts))
        }
        Commands::Authors => {
            let authors = queries.authors().await?;
            emit(json, &authors, |authors| views::author_list(authors))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let queries = build_queries(&cli)?;
    handle(&queries, cli.command, cli.json).await
}
