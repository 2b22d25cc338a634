use std::{process, sync::Arc, time::Duration};

use brewcache::{
    application::{
        error::AppError,
        proxy::{ContentProxyService, ProxyOptions},
        relay::RelayService,
    },
    config::{self, ProbeArgs, Settings},
    domain::actions::ContentQuery,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        mail::SmtpMailer,
        telemetry,
        upstream::WordPressSource,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args.command.unwrap_or_else(|| {
        config::Command::Serve(Box::new(config::ServeArgs {
            overrides: cli_args.serve,
        }))
    });

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Probe(args) => run_probe(settings, args).await,
    }
}

fn build_proxy(settings: &Settings) -> Result<ContentProxyService, AppError> {
    if settings.upstream.base_url.is_none() {
        warn!(
            target = "brewcache::startup",
            "upstream.base_url is not set; content requests will fail"
        );
    }
    let source = WordPressSource::new(&settings.upstream)?;
    Ok(ContentProxyService::new(
        Arc::new(source),
        ProxyOptions {
            per_page: settings.upstream.per_page,
            author_roles: settings.upstream.author_roles.clone(),
        },
    ))
}

fn build_http_state(settings: &Settings) -> Result<HttpState, AppError> {
    let proxy = build_proxy(settings)?;
    let mailer = SmtpMailer::new(&settings.mail)?;
    let relay = RelayService::new(Arc::new(mailer), settings.mail.brand.clone());

    Ok(HttpState {
        proxy: Arc::new(proxy),
        relay: Arc::new(relay),
    })
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let state = build_http_state(&settings)?;
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "brewcache::startup",
        addr = %settings.server.addr,
        "listening"
    );

    let stopping = Arc::new(Notify::new());
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown({
            let stopping = Arc::clone(&stopping);
            async move {
                shutdown_signal().await;
                stopping.notify_waiters();
            }
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        () = grace_expired(&stopping, settings.server.graceful_shutdown) => {
            warn!(
                target = "brewcache::shutdown",
                grace_secs = settings.server.graceful_shutdown.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
        }
    }

    info!(target = "brewcache::shutdown", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "brewcache::shutdown", error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!(target = "brewcache::shutdown", "shutdown requested");
}

async fn grace_expired(stopping: &Notify, grace: Duration) {
    stopping.notified().await;
    tokio::time::sleep(grace).await;
}

async fn run_probe(settings: Settings, args: ProbeArgs) -> Result<(), AppError> {
    let query = ContentQuery::parse(
        Some(args.action.as_str()),
        args.slug.as_deref(),
        args.category_id.as_deref(),
    )
    .map_err(|err| AppError::unexpected(format!("{}: {err}", err.public_message())))?;

    let proxy = build_proxy(&settings)?;
    info!(
        target = "brewcache::probe",
        upstream = %proxy.upstream_request(&query),
        "probing upstream"
    );

    let value = proxy
        .execute(&query)
        .await
        .map_err(|err| AppError::unexpected(format!("probe failed: {err}")))?;
    let rendered = serde_json::to_string_pretty(&value)
        .map_err(|err| AppError::unexpected(format!("failed to render result: {err}")))?;
    println!("{rendered}");
    Ok(())
}
