pub mod rate_limit;
pub mod validate;

pub use rate_limit::{ClientRateLimit, RATE_LIMIT_MESSAGE, rate_limit_middleware};
pub use validate::validate_json;
