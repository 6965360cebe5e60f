pub mod api;
pub mod cleanup;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod problem;
pub mod rate_limiter;
pub mod routes;
pub mod server;
pub mod validation;

pub use api::{
    ExpandMessageRequest, ExpandMessageResponse, ExpandResponse, FieldError, SendEmailRequest,
    SendEmailResponse,
};
pub use cleanup::CleanupService;
pub use config::Config;
pub use handlers::{ApiError, AppState};
pub use rate_limiter::{
    Clock, ManualClock, RateLimitConfig, RateLimitError, RateLimitStatus, RateLimiter, SystemClock,
};
pub use routes::create_router;
