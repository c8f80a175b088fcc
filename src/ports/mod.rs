pub mod repositories;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use repositories::{ProductRepository, TaxonomyRepository, UserRepository};
pub use services::{AuthService, ProductService, TaxonomyService};
pub use storage::MediaStore;
