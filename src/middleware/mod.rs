pub mod auth;
pub mod identity;
pub mod response;

pub use auth::jwt_auth_middleware;
pub use identity::Caller;
pub use response::{ApiResponse, ApiResult};
