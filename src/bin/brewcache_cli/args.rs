//! Command-line surface for `brewcache-cli`.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "brewcache-cli",
    version,
    about = "Read the Brew Cache chronicle from the terminal",
    long_about = None
)]
pub struct Cli {
    /// Site base URL serving `/api/wordpress`, e.g. <https://brewcache.example>
    #[arg(long, env = "BREWCACHE_SITE_URL")]
    pub site: Option<String>,

    /// Seconds a fetched result is reused before it is fetched again
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub stale_seconds: u64,

    /// Print the proxy's JSON instead of the text view
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Latest posts with excerpt, author and date
    Posts,
    /// One post by slug
    Post { slug: String },
    /// One page by slug
    Page { slug: String },
    /// Every category
    Categories,
    /// Posts filed under the category with this slug
    Category { slug: String },
    /// Site authors
    Authors,
}
