use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the Brew Cache server.
#[derive(Debug, Parser)]
#[command(name = "brewcache", version, about = "Brew Cache content proxy and mail relays")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BREWCACHE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Overrides used when no subcommand is given (implicit `serve`).
    #[command(flatten)]
    pub serve: ServeOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Run one proxy action against the upstream content API and print the result.
    Probe(ProbeArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct UpstreamOverrides {
    /// Override the upstream content API base URL (e.g. https://example.com/wp-json/wp/v2).
    #[arg(
        long = "upstream-base-url",
        env = "NEXT_PUBLIC_WORDPRESS_API_URL",
        value_name = "URL"
    )]
    pub upstream_base_url: Option<String>,

    /// Override the upstream request timeout.
    #[arg(long = "upstream-timeout-seconds", value_name = "SECONDS")]
    pub upstream_timeout_seconds: Option<u64>,

    /// Override the page size requested from upstream list endpoints.
    #[arg(long = "upstream-per-page", value_name = "COUNT")]
    pub upstream_per_page: Option<u32>,

    /// Override the user roles listed by `getAuthors` (comma separated).
    #[arg(
        long = "upstream-author-roles",
        value_name = "ROLES",
        value_delimiter = ','
    )]
    pub upstream_author_roles: Option<Vec<String>>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub upstream: UpstreamOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the SMTP relay host.
    #[arg(long = "mail-smtp-host", value_name = "HOST")]
    pub mail_smtp_host: Option<String>,

    /// Override the SMTP relay port.
    #[arg(long = "mail-smtp-port", value_name = "PORT")]
    pub mail_smtp_port: Option<u16>,

    /// Mail account address used as sender and recipient.
    #[arg(long = "mail-address", env = "GOOGLE_EMAIL", value_name = "ADDRESS")]
    pub mail_address: Option<String>,

    /// Mail account application password (environment only).
    #[arg(long = "mail-app-password", hide = true, env = "GOOGLE_APP_PASSWORD")]
    pub mail_app_password: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub upstream: UpstreamOverrides,

    /// Proxy action name, e.g. getPostBySlug.
    #[arg(value_name = "ACTION")]
    pub action: String,

    /// Slug for getPostBySlug / getPageBySlug.
    #[arg(long, value_name = "SLUG")]
    pub slug: Option<String>,

    /// Category id for getPostsByCategory.
    #[arg(long = "category-id", value_name = "ID")]
    pub category_id: Option<String>,
}
