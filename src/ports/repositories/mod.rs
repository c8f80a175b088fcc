mod product_repository;
mod taxonomy_repository;
mod user_repository;

pub use product_repository::ProductRepository;
pub use taxonomy_repository::TaxonomyRepository;
pub use user_repository::UserRepository;
