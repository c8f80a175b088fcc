mod auth_service;
mod product_service;
mod taxonomy_service;

pub use auth_service::AuthService;
pub use product_service::ProductService;
pub use taxonomy_service::TaxonomyService;
