use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })?;

    info!(
        target = "brewcache::telemetry",
        level = %logging.level,
        format = format_label(&logging.format),
        "logging initialised"
    );
    Ok(())
}

fn format_label(format: &LogFormat) -> &'static str {
    match format {
        LogFormat::Json => "json",
        LogFormat::Compact => "compact",
    }
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "brewcache_upstream_request_total",
            Unit::Count,
            "Requests sent to the upstream content API, by resource."
        );
        describe_counter!(
            "brewcache_upstream_failure_total",
            Unit::Count,
            "Upstream content requests that failed, by resource and reason."
        );
        describe_counter!(
            "brewcache_mail_sent_total",
            Unit::Count,
            "Relay mails accepted by the SMTP relay, by kind."
        );
        describe_counter!(
            "brewcache_mail_failure_total",
            Unit::Count,
            "Relay mails that could not be sent, by kind."
        );
        describe_counter!(
            "brewcache_query_cache_hit_total",
            Unit::Count,
            "Queries answered from a fresh cached result."
        );
        describe_counter!(
            "brewcache_query_cache_miss_total",
            Unit::Count,
            "Queries that started a request to the content proxy."
        );
        describe_counter!(
            "brewcache_http_response_total",
            Unit::Count,
            "HTTP responses served, by surface and status class."
        );
        describe_counter!(
            "brewcache_lock_recovered_total",
            Unit::Count,
            "Poisoned query-state locks recovered, by owning module."
        );
        describe_counter!(
            "brewcache_query_dedup_total",
            Unit::Count,
            "Queries that joined a request already in flight for the same key."
        );
    });
}
