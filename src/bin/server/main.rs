use anyhow::{Context, Result};
use catalog_server::{
    adapters::{
        inbound::http::{Environment, HttpConfig, RateLimitConfig},
        outbound::storage::S3Config,
    },
    app::{parse_duration, AppBuilder, AppConfig, MediaBackend, RepositoryBackend, DEVELOPMENT_JWT_SECRET},
    domain::value_objects::MediaFolder,
    services::AuthSettings,
};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "catalog-server")]
#[command(about = "Product catalog and identity API server", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "3000")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Deployment environment (development or production)
    #[arg(long, env = "APP_ENV", default_value = "development")]
    environment: String,

    /// Allowed CORS origin, `*` for any
    #[arg(long, env = "CORS_ORIGIN", default_value = "*")]
    cors_origin: String,

    /// Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value = "900")]
    rate_limit_window_secs: u64,

    /// Requests allowed per client within the window, 0 disables limiting
    #[arg(long, env = "RATE_LIMIT_MAX", default_value = "100")]
    rate_limit_max: u32,

    /// Media backend type (memory, local or s3)
    #[arg(long, env = "MEDIA_BACKEND", default_value = "memory")]
    media_backend: String,

    /// Root directory for the local media backend
    #[arg(long, env = "MEDIA_ROOT", default_value = "./media")]
    media_root: PathBuf,

    /// Public base URL of stored media
    #[arg(long, env = "MEDIA_PUBLIC_URL")]
    media_public_url: Option<String>,

    /// Folder product media is stored under
    #[arg(long, env = "MEDIA_FOLDER", default_value = "products")]
    media_folder: String,

    /// S3 endpoint URL (for S3-compatible hosts)
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// S3 bucket name
    #[arg(long, env = "S3_BUCKET")]
    s3_bucket: Option<String>,

    /// S3 region
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    s3_region: String,

    /// S3 access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET_KEY", hide_env_values = true)]
    s3_secret_key: Option<String>,

    /// Repository backend type (memory or database)
    #[arg(long, env = "REPOSITORY_BACKEND", default_value = "memory")]
    repository_backend: String,

    /// Database URL for repository backend (PostgreSQL)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value = "10")]
    database_max_connections: u32,

    /// Secret used to sign access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Token lifetime, e.g. 7d, 12h, 30m
    #[arg(long, env = "JWT_EXPIRES_IN", default_value = "7d")]
    jwt_expires_in: String,

    /// bcrypt cost factor for password hashes
    #[arg(long, env = "BCRYPT_ROUNDS", default_value = "12")]
    bcrypt_rounds: u32,

    /// Directory for uploads awaiting transfer to the media store
    #[arg(long, env = "UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Maximum multipart request size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "52428800")]
    max_upload_bytes: usize,

    /// Log level or filter directive
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let environment = Environment::parse(&self.environment)
            .with_context(|| format!("Unknown environment: {}", self.environment))?;

        let media_backend = match self.media_backend.as_str() {
            "memory" => MediaBackend::InMemory,
            "local" => MediaBackend::Local {
                root: self.media_root.clone(),
            },
            "s3" => MediaBackend::S3(S3Config {
                bucket: self
                    .s3_bucket
                    .clone()
                    .context("S3_BUCKET is required for the s3 media backend")?,
                region: self.s3_region.clone(),
                access_key: self.s3_access_key.clone(),
                secret_key: self.s3_secret_key.clone(),
                endpoint: self.s3_endpoint.clone(),
            }),
            _ => anyhow::bail!("Unknown media backend: {}", self.media_backend),
        };

        let repository_backend = match self.repository_backend.as_str() {
            "memory" => RepositoryBackend::InMemory,
            "database" | "db" => RepositoryBackend::Database {
                connection_string: self
                    .database_url
                    .clone()
                    .context("DATABASE_URL is required for database backend")?,
                max_connections: self.database_max_connections.max(1),
            },
            _ => anyhow::bail!("Unknown repository backend: {}", self.repository_backend),
        };

        let jwt_secret = match &self.jwt_secret {
            Some(secret) if !secret.is_empty() => secret.clone(),
            _ if environment.is_development() => {
                warn!("JWT_SECRET is not set, using the development secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
            _ => anyhow::bail!("JWT_SECRET is required in production"),
        };

        let rate_limit = (self.rate_limit_max > 0).then(|| RateLimitConfig {
            window: Duration::from_secs(self.rate_limit_window_secs.max(1)),
            max_requests: self.rate_limit_max,
        });

        let defaults = HttpConfig::default();

        Ok(AppConfig {
            media_backend,
            media_public_url: self.media_public_url.clone(),
            media_folder: MediaFolder::new(self.media_folder.clone())
                .map_err(|e| anyhow::anyhow!("Invalid MEDIA_FOLDER: {}", e))?,
            repository_backend,
            auth: AuthSettings {
                jwt_secret,
                token_ttl: parse_duration(&self.jwt_expires_in)?,
                bcrypt_cost: self.bcrypt_rounds,
            },
            http: HttpConfig {
                environment,
                cors_origin: self.cors_origin.clone(),
                rate_limit,
                upload_dir: self.upload_dir.clone().unwrap_or(defaults.upload_dir),
                max_upload_bytes: self.max_upload_bytes,
                ..defaults
            },
        })
    }

    fn init_logging(&self) -> Result<()> {
        let env_filter = EnvFilter::try_new(&self.log_level)
            .or_else(|_| EnvFilter::try_new("info"))
            .context("Failed to build log filter")?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to initialize logging")?;

        Ok(())
    }
}

/// Resolve once SIGINT or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!("Starting catalog server");
    info!("Media backend: {}", cli.media_backend);
    info!("Repository backend: {}", cli.repository_backend);

    let config = cli.to_app_config()?;
    info!("Environment: {}", config.http.environment.as_str());

    let app = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on http://{}/api/v1", addr);

    axum::serve(
        listener,
        app.router()
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    app.shutdown().await;
    info!("Server stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "catalog-server",
            "--port",
            "8080",
            "--media-backend",
            "s3",
            "--s3-bucket",
            "catalog-media",
            "--jwt-expires-in",
            "12h",
        ]);

        assert_eq!(cli.port, 8080);
        assert_eq!(cli.media_backend, "s3");
        assert_eq!(cli.s3_bucket, Some("catalog-media".to_string()));

        let config = cli.to_app_config().unwrap();
        assert!(matches!(config.media_backend, MediaBackend::S3(_)));
        assert_eq!(config.auth.token_ttl, chrono::Duration::hours(12));
    }

    #[test]
    fn test_memory_config() {
        let cli = Cli::parse_from(["catalog-server"]);

        let config = cli.to_app_config().unwrap();
        assert!(matches!(config.media_backend, MediaBackend::InMemory));
        assert!(matches!(config.repository_backend, RepositoryBackend::InMemory));
        assert_eq!(config.media_folder.as_str(), "products");
        assert!(config.http.rate_limit.is_some());
    }

    #[test]
    fn test_production_requires_secret() {
        let cli = Cli::parse_from(["catalog-server", "--environment", "production"]);
        assert!(cli.to_app_config().is_err());
    }

    #[test]
    fn test_zero_rate_limit_disables_limiting() {
        let cli = Cli::parse_from(["catalog-server", "--rate-limit-max", "0"]);
        assert!(cli.to_app_config().unwrap().http.rate_limit.is_none());
    }
}
