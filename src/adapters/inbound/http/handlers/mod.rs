pub mod auth_handlers;
pub mod health_handlers;
pub mod product_handlers;
pub mod taxonomy_handlers;

pub use auth_handlers::*;
pub use health_handlers::*;
pub use product_handlers::*;
pub use taxonomy_handlers::*;
