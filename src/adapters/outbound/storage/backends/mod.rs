//! Media store backends built on the object_store crate

use anyhow::{Context, Result};
use object_store::{
    aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory,
    ObjectStore as ObjectStoreBackend,
};
use std::{path::Path, sync::Arc};

/// Configuration for an S3 or S3-compatible bucket
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
}

/// Create an S3 store from configuration
pub fn create_s3_store(config: &S3Config) -> Result<Arc<dyn ObjectStoreBackend>> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        // S3-compatible hosts such as MinIO are usually served over plain HTTP
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"))
            .with_virtual_hosted_style_request(false);
    }

    let store = builder.build().context("Failed to build S3 store")?;

    Ok(Arc::new(store))
}

/// Create a store rooted at a local directory, creating it if needed
pub fn create_local_store(root: &Path) -> Result<Arc<dyn ObjectStoreBackend>> {
    std::fs::create_dir_all(root)
        .with_context(|| format!("Failed to create media root {}", root.display()))?;

    let store = LocalFileSystem::new_with_prefix(root)
        .with_context(|| format!("Failed to open media root {}", root.display()))?;

    Ok(Arc::new(store))
}

pub fn create_memory_store() -> Arc<dyn ObjectStoreBackend> {
    Arc::new(InMemory::new())
}
