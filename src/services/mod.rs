mod auth_service_impl;
mod product_service_impl;
mod taxonomy_service_impl;

pub use auth_service_impl::{AuthServiceImpl, AuthSettings};
pub use product_service_impl::{ProductServiceBuilder, ProductServiceImpl};
pub use taxonomy_service_impl::TaxonomyServiceImpl;
