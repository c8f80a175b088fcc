pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use config::{Environment, HttpConfig, RateLimitConfig};
pub use error::ApiError;
pub use router::{create_router, AppState};
