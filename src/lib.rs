pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Errors
    CatalogError,
    CatalogResult,
    FieldError,
    Validate,
    // Models
    AuthSession,
    AuthenticatedUser,
    CreateProductRequest,
    Page,
    Pagination,
    Product,
    ProductDetails,
    ProductFilter,
    Role,
    TaxonomyEntry,
    TaxonomyKind,
    UpdateProductRequest,
    UploadedFile,
    User,
    // Value objects
    ColorName,
    Email,
    MediaFolder,
};

// Port types - interfaces for external systems
pub use ports::{
    AuthService, MediaStore, ProductRepository, ProductService, TaxonomyRepository,
    TaxonomyService, UserRepository,
};

// Service implementations - business logic
pub use services::{
    AuthServiceImpl, AuthSettings, ProductServiceBuilder, ProductServiceImpl, TaxonomyServiceImpl,
};

// Application factory and configuration
pub use app::{
    create_in_memory_app, parse_duration, AppBuilder, AppConfig, AppDependencies, AppError,
    AppServices, MediaBackend, RepositoryBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::ObjectStoreMediaAdapter;

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, AppBuilder, AppServices, CatalogError, CatalogResult, MediaStore,
        ObjectStoreMediaAdapter, ProductRepository, ProductService, ProductServiceImpl,
        TaxonomyKind, TaxonomyService,
    };
}
