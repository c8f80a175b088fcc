use axum::Router;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{path::PathBuf, sync::Arc};

use crate::{
    adapters::{
        inbound::http::{create_router, AppState, HttpConfig},
        outbound::{
            persistence::{
                InMemoryCatalogRepository, InMemoryUserRepository, SqlProductRepository,
                SqlTaxonomyRepository, SqlUserRepository,
            },
            storage::{
                create_local_store, create_memory_store, create_s3_store, ObjectStoreMediaAdapter,
                S3Config,
            },
        },
    },
    domain::value_objects::MediaFolder,
    ports::{
        repositories::{ProductRepository, TaxonomyRepository, UserRepository},
        storage::MediaStore,
    },
    services::{AuthServiceImpl, AuthSettings, ProductServiceBuilder, TaxonomyServiceImpl},
};

/// Secret used when none is configured; only acceptable outside production
pub const DEVELOPMENT_JWT_SECRET: &str = "development-only-secret";

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub media_backend: MediaBackend,
    /// Base URL media ids are appended to; derived from the backend if unset
    pub media_public_url: Option<String>,
    pub media_folder: MediaFolder,
    pub repository_backend: RepositoryBackend,
    pub auth: AuthSettings,
    pub http: HttpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            media_backend: MediaBackend::InMemory,
            media_public_url: None,
            media_folder: MediaFolder::default(),
            repository_backend: RepositoryBackend::InMemory,
            auth: AuthSettings {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                token_ttl: chrono::Duration::days(7),
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            http: HttpConfig::default(),
        }
    }
}

/// Media backend configuration
#[derive(Debug, Clone)]
pub enum MediaBackend {
    InMemory,
    Local { root: PathBuf },
    S3(S3Config),
}

impl MediaBackend {
    pub fn name(&self) -> &'static str {
        match self {
            MediaBackend::InMemory => "memory",
            MediaBackend::Local { .. } => "local",
            MediaBackend::S3(_) => "s3",
        }
    }

    fn default_public_url(&self) -> String {
        match self {
            MediaBackend::InMemory => "memory://media".to_string(),
            MediaBackend::Local { root } => format!("file://{}", root.display()),
            MediaBackend::S3(config) => match &config.endpoint {
                Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), config.bucket),
                None => format!(
                    "https://{}.s3.{}.amazonaws.com",
                    config.bucket, config.region
                ),
            },
        }
    }
}

/// Repository backend configuration
#[derive(Debug, Clone)]
pub enum RepositoryBackend {
    InMemory,
    Database {
        connection_string: String,
        max_connections: u32,
    },
}

/// Application dependencies container
#[derive(Clone)]
pub struct AppDependencies {
    pub product_repository: Arc<dyn ProductRepository>,
    pub taxonomy_repository: Arc<dyn TaxonomyRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub media_store: Arc<dyn MediaStore>,
    pub pool: Option<PgPool>,
}

impl AppDependencies {
    /// In-process repositories sharing one catalog, plus the given media store
    pub fn in_memory(media_store: Arc<dyn MediaStore>) -> Self {
        let catalog = Arc::new(InMemoryCatalogRepository::new());
        Self {
            product_repository: catalog.clone(),
            taxonomy_repository: catalog,
            user_repository: Arc::new(InMemoryUserRepository::new()),
            media_store,
            pool: None,
        }
    }
}

/// Application services container
#[derive(Clone)]
pub struct AppServices {
    pub state: AppState,
    pool: Option<PgPool>,
}

impl AppServices {
    /// The HTTP router over these services
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Release process-wide handles
    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            tracing::info!("Closing database pool");
            pool.close().await;
        }
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_media_backend(mut self, backend: MediaBackend) -> Self {
        self.config.media_backend = backend;
        self
    }

    pub fn with_repository_backend(mut self, backend: RepositoryBackend) -> Self {
        self.config.repository_backend = backend;
        self
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.config.http = http;
        self
    }

    pub fn with_auth_settings(mut self, auth: AuthSettings) -> Self {
        self.config.auth = auth;
        self
    }

    /// Build the application dependencies
    pub async fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        let media_store = self.create_media_store()?;

        match &self.config.repository_backend {
            RepositoryBackend::InMemory => Ok(AppDependencies::in_memory(media_store)),
            RepositoryBackend::Database {
                connection_string,
                max_connections,
            } => {
                let pool = PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .connect(connection_string)
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to connect to database: {}", e),
                    })?;

                let taxonomy = SqlTaxonomyRepository::new(pool.clone());
                let products = SqlProductRepository::new(pool.clone());
                let users = SqlUserRepository::new(pool.clone());

                // Products reference taxonomy tables, so they migrate after them
                taxonomy.migrate().await.map_err(migration_error)?;
                products.migrate().await.map_err(migration_error)?;
                users.migrate().await.map_err(migration_error)?;
                tracing::info!("Database schema is up to date");

                Ok(AppDependencies {
                    product_repository: Arc::new(products),
                    taxonomy_repository: Arc::new(taxonomy),
                    user_repository: Arc::new(users),
                    media_store,
                    pool: Some(pool),
                })
            }
        }
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let deps = self.build_dependencies().await?;
        self.build_with(deps)
    }

    /// Wire services over already constructed dependencies
    pub fn build_with(self, deps: AppDependencies) -> Result<AppServices, AppError> {
        let product_service = ProductServiceBuilder::new()
            .repository(deps.product_repository.clone())
            .media(deps.media_store.clone())
            .folder(self.config.media_folder.clone())
            .build()
            .map_err(|e| AppError::ServiceInit {
                message: e.to_string(),
            })?;

        let taxonomy_service = TaxonomyServiceImpl::new(deps.taxonomy_repository.clone());
        let auth_service = AuthServiceImpl::new(deps.user_repository.clone(), self.config.auth);

        Ok(AppServices {
            state: AppState {
                product_service: Arc::new(product_service),
                taxonomy_service: Arc::new(taxonomy_service),
                auth_service: Arc::new(auth_service),
                config: Arc::new(self.config.http),
            },
            pool: deps.pool,
        })
    }

    fn create_media_store(&self) -> Result<Arc<dyn MediaStore>, AppError> {
        let backend = &self.config.media_backend;
        let store = match backend {
            MediaBackend::InMemory => Ok(create_memory_store()),
            MediaBackend::Local { root } => create_local_store(root),
            MediaBackend::S3(config) => create_s3_store(config),
        }
        .map_err(|e| AppError::StorageInit {
            message: format!("{:#}", e),
        })?;

        let public_url = self
            .config
            .media_public_url
            .clone()
            .unwrap_or_else(|| backend.default_public_url());

        tracing::info!(backend = backend.name(), public_url = %public_url, "Media store configured");

        Ok(Arc::new(ObjectStoreMediaAdapter::new(store, public_url)))
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn migration_error(e: sqlx::Error) -> AppError {
    AppError::RepositoryInit {
        message: format!("Migration failed: {}", e),
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },

    #[error("Repository initialization error: {message}")]
    RepositoryInit { message: String },

    #[error("Service initialization error: {message}")]
    ServiceInit { message: String },
}

/// Parse a lifetime such as `7d`, `12h`, `30m` or `3600s`. A bare number is
/// taken as seconds.
pub fn parse_duration(value: &str) -> Result<chrono::Duration, AppError> {
    let value = value.trim();
    let invalid = || AppError::Configuration {
        message: format!("Invalid duration '{}'", value),
    };

    let (digits, unit) = match value.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&value[..i], c.to_ascii_lowercase()),
        Some(_) => (value, 's'),
        None => return Err(invalid()),
    };

    let amount: i64 = digits.trim().parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let duration = match unit {
        's' => chrono::Duration::try_seconds(amount),
        'm' => chrono::Duration::try_minutes(amount),
        'h' => chrono::Duration::try_hours(amount),
        'd' => chrono::Duration::try_days(amount),
        _ => None,
    };

    duration
        .filter(|d| chrono::Utc::now().checked_add_signed(*d).is_some())
        .ok_or_else(invalid)
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_media_backend(MediaBackend::InMemory)
        .with_repository_backend(RepositoryBackend::InMemory)
        .build()
        .await
}
