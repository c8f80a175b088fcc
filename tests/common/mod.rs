#![allow(dead_code)]

use async_trait::async_trait;
use catalog_server::{
    adapters::outbound::{persistence::InMemoryCatalogRepository, storage::ObjectStoreMediaAdapter},
    app::{AppBuilder, AppDependencies, AppServices},
    domain::{
        errors::{CatalogError, CatalogResult},
        models::{
            CreateProductRequest, NewProductAggregate, Page, Pagination, ProductChanges,
            ProductDetails, ProductFilter, StoredMedia, UpdatedProduct, UploadedFile,
        },
        value_objects::{ColorName, MediaFolder},
    },
    ports::{repositories::ProductRepository, storage::MediaStore},
    services::{AuthSettings, ProductServiceImpl},
};
use std::{
    io::Write,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use uuid::Uuid;

/// Media store that records every upload and delete and can be told to fail
#[derive(Default)]
pub struct RecordingMediaStore {
    inner: Option<ObjectStoreMediaAdapter>,
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    fail_videos: AtomicBool,
}

impl RecordingMediaStore {
    pub fn new() -> Self {
        Self {
            inner: Some(ObjectStoreMediaAdapter::in_memory()),
            ..Default::default()
        }
    }

    /// Make every video upload fail
    pub fn fail_videos(&self) {
        self.fail_videos.store(true, Ordering::SeqCst);
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload(&self, local_path: &Path, folder: &MediaFolder) -> CatalogResult<StoredMedia> {
        let is_video = local_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "mp4");
        if is_video && self.fail_videos.load(Ordering::SeqCst) {
            return Err(CatalogError::media("video upload rejected"));
        }

        let inner = self.inner.as_ref().expect("inner store");
        let stored = inner.upload(local_path, folder).await?;
        self.uploaded.lock().unwrap().push(stored.media_id.clone());
        Ok(stored)
    }

    async fn delete_many(&self, media_ids: &[String]) -> CatalogResult<()> {
        self.deleted.lock().unwrap().extend(media_ids.iter().cloned());
        let inner = self.inner.as_ref().expect("inner store");
        inner.delete_many(media_ids).await
    }
}

/// Product repository whose aggregate writes can be made to fail, as a
/// failed transaction would
pub struct FailingProductRepository {
    inner: Arc<InMemoryCatalogRepository>,
    fail_writes: AtomicBool,
}

impl FailingProductRepository {
    pub fn new(inner: Arc<InMemoryCatalogRepository>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> CatalogResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(CatalogError::internal("transaction aborted"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProductRepository for FailingProductRepository {
    async fn create_aggregate(&self, aggregate: NewProductAggregate) -> CatalogResult<ProductDetails> {
        self.check()?;
        self.inner.create_aggregate(aggregate).await
    }

    async fn update_aggregate(&self, id: Uuid, changes: ProductChanges) -> CatalogResult<UpdatedProduct> {
        self.check()?;
        self.inner.update_aggregate(id, changes).await
    }

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool> {
        self.inner.delete_product(id).await
    }

    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<ProductDetails>> {
        self.inner.find_by_id(id).await
    }

    async fn name_exists(&self, name: &str) -> CatalogResult<bool> {
        self.inner.name_exists(name).await
    }

    async fn find_page(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>> {
        self.inner.find_page(filter, pagination).await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> CatalogResult<Vec<ProductDetails>> {
        self.inner.find_by_ids(ids).await
    }
}

/// Everything a product service test needs to observe
pub struct ProductHarness {
    pub service: ProductServiceImpl,
    pub catalog: Arc<InMemoryCatalogRepository>,
    pub repository: Arc<FailingProductRepository>,
    pub media: Arc<RecordingMediaStore>,
}

pub fn product_harness() -> ProductHarness {
    let catalog = Arc::new(InMemoryCatalogRepository::new());
    let repository = Arc::new(FailingProductRepository::new(catalog.clone()));
    let media = Arc::new(RecordingMediaStore::new());
    let service = ProductServiceImpl::new(repository.clone(), media.clone(), MediaFolder::default());

    ProductHarness {
        service,
        catalog,
        repository,
        media,
    }
}

/// A local upload with the given extension and content type
pub fn upload(extension: &str, content_type: &str) -> UploadedFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    file.write_all(b"media bytes").unwrap();
    let name = format!("fixture.{}", extension);
    UploadedFile::new(file.into_temp_path(), content_type, name)
}

pub fn image(extension: &str) -> UploadedFile {
    upload(extension, &format!("image/{}", extension))
}

pub fn video() -> UploadedFile {
    upload("mp4", "video/mp4")
}

pub fn colors(names: &[&str]) -> Vec<ColorName> {
    ColorName::parse_all(names.iter().copied()).unwrap()
}

pub fn create_request(name: &str, price: f64) -> CreateProductRequest {
    CreateProductRequest {
        name: name.to_string(),
        short_description: "Short".to_string(),
        detailed_description: "A longer description".to_string(),
        price: Some(price),
        original_price: Some(price + 10.0),
        discount: Some(0.0),
        tax: Some(0.0),
        ..Default::default()
    }
}

/// Low-cost hashing keeps auth tests fast
pub fn test_auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-secret".to_string(),
        token_ttl: chrono::Duration::hours(1),
        bcrypt_cost: 4,
    }
}

/// An in-memory application with fast hashing and the given media store
pub fn test_app(media: Arc<dyn MediaStore>) -> AppServices {
    AppBuilder::new()
        .with_auth_settings(test_auth_settings())
        .build_with(AppDependencies::in_memory(media))
        .unwrap()
}
