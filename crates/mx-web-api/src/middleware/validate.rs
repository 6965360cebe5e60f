use axum::{
    Json,
    body::Body,
    extract::{FromRequest, Request},
    http,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{handlers::ApiError, validation::Validate};

/// Parses and validates a JSON body of type `T`.
///
/// On success the validated input is stored as a request extension for the
/// handler and the request continues with an empty body. Rejected requests are
/// answered here, so layers inside this one (the rate limiter) never see them.
pub async fn validate_json<T>(request: Request, next: Next) -> Response
where
    T: Validate + DeserializeOwned + Send + 'static,
    T::Output: Clone + Send + Sync + 'static,
{
    let (mut parts, body) = request.into_parts();

    let mut body_request = http::Request::new(body);
    *body_request.headers_mut() = parts.headers.clone();

    let input = match Json::<T>::from_request(body_request, &()).await {
        Ok(Json(payload)) => payload.validate().map_err(ApiError::Validation),
        Err(rejection) => Err(ApiError::from(rejection)),
    };

    match input {
        Ok(input) => {
            parts.extensions.insert(input);
            next.run(http::Request::from_parts(parts, Body::empty())).await
        }
        Err(err) => {
            debug!("Rejected request to {}: {}", parts.uri.path(), err);
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::ExpandMessageRequest, validation::MessageInput};
    use axum::{
        Extension, Router,
        body::to_bytes,
        http::{StatusCode, header},
        middleware,
        routing::post,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/echo",
            post(|Extension(input): Extension<MessageInput>| async move { input.message })
                .route_layer(middleware::from_fn(validate_json::<ExpandMessageRequest>)),
        )
    }

    fn post_body(content_type: &str, body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler_trimmed() {
        let response = app()
            .oneshot(post_body("application/json", r#"{"message": "  hi there  "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hi there");
    }

    #[tokio::test]
    async fn test_invalid_field_is_rejected() {
        let response = app()
            .oneshot(post_body("application/json", r#"{"message": "  "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_json_content_type_is_rejected() {
        let response = app()
            .oneshot(post_body("text/plain", r#"{"message": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
