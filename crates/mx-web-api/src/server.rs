use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use mx_expand::{Expander, OpenAiClient};
use mx_mail::{MailService, build_mailer};

use crate::{
    cleanup::CleanupService,
    config::{Config, LogFormat},
    handlers::AppState,
    rate_limiter::RateLimiter,
    routes::create_router,
};

pub fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());

    match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .init();
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Wires the completion client, mailer and expander from configuration.
pub fn build_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let client = OpenAiClient::new(config.completion.clone())?;
    let expander = Expander::new(Arc::new(client), config.failure_policy);
    let mailer = build_mailer(&config.mail)?;
    let mail = MailService::new(expander.clone(), mailer, config.mail.settings.clone());

    Ok(AppState { expander, mail })
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting mx-web-api server with config: {:?}", config);

    if config.completion.api_key.is_empty() {
        info!("OPENAI_API_KEY is not set, expansion requests will fail");
    }

    let state = build_state(&config)?;
    info!(
        "Expander initialized with failure policy: {}",
        state.expander.policy()
    );

    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone())?);
    info!("Rate limiter initialized successfully");

    let app = create_router(&config, state, rate_limiter.clone()).layer(TraceLayer::new_for_http().on_response(
        |response: &axum::response::Response, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                "response latency: {:?}, status: {}",
                latency,
                response.status()
            );
        },
    ));

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    let server_url = config.server_url();
    info!("Server running on {}", server_url);
    info!("OpenAPI docs available at {}/openapi.json", server_url);

    info!("Configuration options:");
    info!("  MX_HOST: Host to bind to (default: 0.0.0.0)");
    info!("  MX_PORT or PORT: Port to bind to (default: 3000)");
    info!("  RUST_LOG or MX_LOG_LEVEL: Log level (default: mx_web_api=debug,mx_expand=debug,mx_mail=debug,tower_http=debug)");
    info!("  MX_LOG_FORMAT: Log format - 'json' or 'text' (default: text)");
    info!("  MX_CORS_ORIGINS: Comma-separated CORS origins (default: *)");
    info!("  MX_RATE_LIMIT_REQUESTS_PER_WINDOW: Requests per window (default: 5)");
    info!("  MX_RATE_LIMIT_WINDOW_SIZE_SECONDS: Window size in seconds (default: 60)");
    info!("  MX_RATE_LIMIT_CLEANUP_INTERVAL_SECONDS: Cleanup interval in seconds (default: 60)");
    info!("  MX_TRUST_PROXY: Key rate limits on X-Forwarded-For / X-Real-IP (default: false)");
    info!("  OPENAI_API_KEY / MX_COMPLETION_API_BASE / MX_COMPLETION_MODEL: Completion provider");
    info!("  MX_EXPAND_ON_FAILURE: 'fail' or 'fallback' (default: fail)");
    info!("  EMAIL_USER / EMAIL_PASS or SMTP_HOST / SMTP_PORT / SMTP_USER / SMTP_PASS: Mail transport");
    info!("  MX_MAIL_PREVIEW_DIR: Write mail to .eml files instead of sending");

    let mut cleanup_service = CleanupService::new(
        Arc::clone(&rate_limiter),
        config.rate_limit.cleanup_interval_seconds.max(1) as u64,
    );
    cleanup_service.start();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cleanup_service.stop();
    info!("Shutting down mx-web-api server");

    Ok(())
}
