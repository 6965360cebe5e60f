use axum::{
    Extension,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use mx_expand::{ExpandError, Expander};
use mx_mail::{MailError, MailService};
use thiserror::Error;
use tracing::{debug, error, info};
use utoipa::OpenApi;

use crate::{
    api::{
        ExpandMessageRequest, ExpandMessageResponse, ExpandResponse, FieldError, SendEmailRequest,
        SendEmailResponse,
    },
    problem::ProblemDetails,
    validation::{EmailInput, MessageInput},
};

pub const LIVENESS_MESSAGE: &str = "Message expander service is running";
pub const EMAIL_SENT_MESSAGE: &str = "Email sent successfully!";

#[derive(Clone)]
pub struct AppState {
    pub expander: Expander,
    pub mail: MailService,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error(transparent)]
    Expand(#[from] ExpandError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

fn expand_failure(err: &ExpandError) -> Response {
    match err {
        ExpandError::EmptyMessage => {
            ApiError::Validation(vec![FieldError::new("message", err.to_string())]).into_response()
        }
        ExpandError::Provider(_) => ProblemDetails::new(StatusCode::INTERNAL_SERVER_ERROR)
            .with_title("Failed to expand message")
            .with_detail(&err.to_string())
            .into_response(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => ProblemDetails::new(StatusCode::BAD_REQUEST)
                .with_title("Validation failed")
                .with_extension("errors", errors)
                .into_response(),
            ApiError::InvalidBody(detail) => ProblemDetails::new(StatusCode::BAD_REQUEST)
                .with_title("Invalid request body")
                .with_detail(&detail)
                .into_response(),
            ApiError::Expand(err) | ApiError::Mail(MailError::Expand(err)) => expand_failure(&err),
            ApiError::Mail(err) => ProblemDetails::new(StatusCode::INTERNAL_SERVER_ERROR)
                .with_title("Failed to send email")
                .with_detail(&err.to_string())
                .into_response(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(root, expand_message, expand, send_email, openapi_json),
    components(
        schemas(ExpandMessageRequest),
        schemas(ExpandMessageResponse),
        schemas(ExpandResponse),
        schemas(SendEmailRequest),
        schemas(SendEmailResponse),
        schemas(FieldError)
    ),
    tags(
        (name = "mx-api", description = "Message expansion and delivery API")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain"),
    )
)]
pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

#[utoipa::path(
    post,
    path = "/expand-message",
    responses(
        (status = 200, description = "Message expanded", body = ExpandMessageResponse),
        (status = 400, description = "Invalid request"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Completion provider failure"),
    ),
    request_body = ExpandMessageRequest
)]
pub async fn expand_message(
    State(state): State<AppState>,
    Extension(input): Extension<MessageInput>,
) -> Result<Json<ExpandMessageResponse>, ApiError> {
    debug!("POST /expand-message called with {} characters", input.message.len());

    match state.expander.expand(&input.message).await {
        Ok(expanded) => {
            info!("Successfully expanded message");
            Ok(Json(ExpandMessageResponse {
                original: input.message,
                expanded,
            }))
        }
        Err(e) => {
            error!("Failed to expand message: {}", e);
            Err(e.into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/expand",
    responses(
        (status = 200, description = "Message expanded", body = ExpandResponse),
        (status = 400, description = "Invalid request"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Completion provider failure"),
    ),
    request_body = ExpandMessageRequest
)]
pub async fn expand(
    State(state): State<AppState>,
    Extension(input): Extension<MessageInput>,
) -> Result<Json<ExpandResponse>, ApiError> {
    debug!("POST /expand called with {} characters", input.message.len());

    match state.expander.expand(&input.message).await {
        Ok(expanded_message) => Ok(Json(ExpandResponse { expanded_message })),
        Err(e) => {
            error!("Failed to expand message: {}", e);
            Err(e.into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/send-email",
    responses(
        (status = 200, description = "Email sent", body = SendEmailResponse),
        (status = 400, description = "Invalid request"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Expansion or delivery failure"),
    ),
    request_body = SendEmailRequest
)]
pub async fn send_email(
    State(state): State<AppState>,
    Extension(input): Extension<EmailInput>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    debug!("POST /send-email called with {} characters", input.message.len());

    match state
        .mail
        .send_expanded(&input.name, &input.email, &input.message)
        .await
    {
        Ok(receipt) => Ok(Json(SendEmailResponse {
            message: EMAIL_SENT_MESSAGE.to_string(),
            preview_url: receipt.preview_url,
        })),
        Err(e) => {
            error!("Failed to send email: {}", e);
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI specification", body = String),
    )
)]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    debug!("GET /openapi.json called");
    Json(ApiDoc::openapi())
}
