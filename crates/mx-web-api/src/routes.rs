use axum::{
    Router,
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::{any::Any as PanicPayload, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
};
use tracing::{error, warn};

use crate::{
    api::{ExpandMessageRequest, SendEmailRequest},
    config::Config,
    handlers::{AppState, expand, expand_message, openapi_json, root, send_email},
    middleware::{ClientRateLimit, rate_limit_middleware, validate_json},
    problem::ProblemDetails,
    rate_limiter::RateLimiter,
};

fn cors_layer(config: &Config) -> CorsLayer {
    let allow_all = || {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
            .allow_origin(Any)
    };

    if config.cors_origins.contains(&"*".to_string()) {
        return allow_all();
    }

    let origins: Result<Vec<_>, _> = config
        .cors_origins
        .iter()
        .map(|origin| origin.parse())
        .collect();

    match origins {
        Ok(origins) => CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
            .allow_origin(origins),
        Err(_) => {
            warn!("Invalid CORS origins, falling back to allow all");
            allow_all()
        }
    }
}

fn handle_panic(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);

    ProblemDetails::new(StatusCode::INTERNAL_SERVER_ERROR)
        .with_title("Something went wrong")
        .into_response()
}

pub fn create_router(config: &Config, state: AppState, rate_limiter: Arc<RateLimiter>) -> Router {
    let rate_limit = middleware::from_fn_with_state(
        ClientRateLimit {
            limiter: rate_limiter,
            trust_proxy: config.trust_proxy,
        },
        rate_limit_middleware,
    );

    // Validation wraps the limiter so rejected bodies never count. Each route
    // gets its own window per client.
    Router::new()
        .route("/", get(root))
        .route("/openapi.json", get(openapi_json))
        .route(
            "/expand-message",
            post(expand_message)
                .route_layer(rate_limit.clone())
                .route_layer(middleware::from_fn(validate_json::<ExpandMessageRequest>)),
        )
        .route(
            "/expand",
            post(expand)
                .route_layer(rate_limit.clone())
                .route_layer(middleware::from_fn(validate_json::<ExpandMessageRequest>)),
        )
        .route(
            "/send-email",
            post(send_email)
                .route_layer(rate_limit)
                .route_layer(middleware::from_fn(validate_json::<SendEmailRequest>)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(cors_layer(config)),
        )
        .with_state(state)
}
