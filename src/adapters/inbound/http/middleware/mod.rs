pub mod auth;
pub mod errors;
pub mod multipart;
pub mod rate_limit;
pub mod security;
pub mod validation;

pub use auth::{AdminUser, AuthUser, MaybeAuthUser};
pub use errors::expose_error_details;
pub use multipart::ProductForm;
pub use rate_limit::{rate_limit, ClientRateLimiter};
pub use security::security_headers;
pub use validation::ValidatedJson;
