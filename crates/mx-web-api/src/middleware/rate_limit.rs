use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{debug, warn};

use crate::rate_limiter::{RateLimitError, RateLimiter};

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// The limiter together with the rule for identifying a client.
#[derive(Debug, Clone)]
pub struct ClientRateLimit {
    pub limiter: Arc<RateLimiter>,
    /// Forwarding headers are client-controlled; only honor them behind a proxy.
    pub trust_proxy: bool,
}

pub async fn rate_limit_middleware(
    State(limit): State<ClientRateLimit>,
    request: Request,
    next: Next,
) -> Response {
    let rate_limiter = &limit.limiter;
    let identifier = format!(
        "{}|{}",
        route_of(&request),
        extract_identifier(&request, limit.trust_proxy)
    );

    match rate_limiter.check_and_increment(&identifier) {
        Ok(status) => {
            debug!("Rate limit check passed for identifier: {}", identifier);

            let mut response = next.run(request).await;
            add_rate_limit_headers(&mut response, status.used, rate_limiter);
            response
        }
        Err(RateLimitError::LimitExceeded {
            requests,
            limit,
            retry_after_seconds,
        }) => {
            warn!(
                "Rate limit exceeded for identifier '{}': {}/{} requests",
                identifier, requests, limit
            );

            let mut response = create_rate_limit_exceeded_response(retry_after_seconds);
            add_rate_limit_headers(&mut response, requests, rate_limiter);
            response
        }
        Err(err) => {
            // The limiter cannot fail once built; keep serving if that changes.
            warn!("Rate limiter error for identifier '{}': {}", identifier, err);
            next.run(request).await
        }
    }
}

fn route_of(request: &Request) -> &str {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str())
        .unwrap_or_else(|| request.uri().path())
}

fn forwarded_client(request: &Request) -> Option<String> {
    if let Some(forwarded_for) = request.headers().get("x-forwarded-for")
        && let Ok(forwarded_str) = forwarded_for.to_str()
        && let Some(first_ip) = forwarded_str.split(',').next()
        && !first_ip.trim().is_empty()
    {
        return Some(first_ip.trim().to_string());
    }

    if let Some(real_ip) = request.headers().get("x-real-ip")
        && let Ok(ip_str) = real_ip.to_str()
        && !ip_str.trim().is_empty()
    {
        return Some(ip_str.trim().to_string());
    }

    None
}

fn extract_identifier(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy && let Some(client) = forwarded_client(request) {
        return client;
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

fn create_rate_limit_exceeded_response(retry_after_seconds: i64) -> Response {
    let mut response = (StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE).into_response();
    if let Ok(retry_after) = HeaderValue::from_str(&retry_after_seconds.max(0).to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, retry_after);
    }
    response
}

fn add_rate_limit_headers(response: &mut Response, current_usage: i64, rate_limiter: &RateLimiter) {
    let headers = response.headers_mut();

    if let Ok(usage_header) = HeaderValue::from_str(&current_usage.to_string()) {
        headers.insert("X-RateLimit-Used", usage_header);
    }

    if let Ok(limit_header) = HeaderValue::from_str(&rate_limiter.requests_per_window().to_string()) {
        headers.insert("X-RateLimit-Limit", limit_header);
    }

    let remaining = (rate_limiter.requests_per_window() - current_usage).max(0);
    if let Ok(remaining_header) = HeaderValue::from_str(&remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", remaining_header);
    }

    if let Ok(window_header) = HeaderValue::from_str(&rate_limiter.window_size_seconds().to_string()) {
        headers.insert("X-RateLimit-Window", window_header);
    }
}
