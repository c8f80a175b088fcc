mod db_error;

pub mod in_memory_catalog_repository;
pub mod in_memory_user_repository;
pub mod sql_product_repository;
pub mod sql_taxonomy_repository;
pub mod sql_user_repository;

pub use in_memory_catalog_repository::InMemoryCatalogRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use sql_product_repository::SqlProductRepository;
pub use sql_taxonomy_repository::SqlTaxonomyRepository;
pub use sql_user_repository::SqlUserRepository;
