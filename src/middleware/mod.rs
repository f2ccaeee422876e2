pub mod auth;
pub mod journal_access;
pub mod rate_limit;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use journal_access::{parse_id, require_journal_owner, OwnedJournal};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use response::{ApiResponse, ApiResult};
