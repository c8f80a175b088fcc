use async_trait::async_trait;
use std::{path::Path, sync::Arc};
use uuid::Uuid;

use crate::{
    domain::{
        errors::{CatalogError, CatalogResult, Validate},
        models::{
            normalize_tag, partition_uploads, CreateProductRequest, NewProductAggregate, Page,
            Pagination, PartitionedUploads, ProductChanges, ProductDetails, ProductFilter,
            StoredMedia, UpdateProductRequest, UploadedFile,
        },
        value_objects::MediaFolder,
    },
    ports::{repositories::ProductRepository, services::ProductService, storage::MediaStore},
};

/// Media uploaded for one request, not yet owned by any committed row
#[derive(Debug, Default)]
struct UploadedMedia {
    images: Vec<StoredMedia>,
    video: Option<StoredMedia>,
}

impl UploadedMedia {
    fn media_ids(&self) -> Vec<String> {
        self.images
            .iter()
            .chain(self.video.iter())
            .map(|m| m.media_id.clone())
            .collect()
    }
}

/// Implementation of ProductService that coordinates the media store with
/// the product repository
#[derive(Clone)]
pub struct ProductServiceImpl {
    repository: Arc<dyn ProductRepository>,
    media: Arc<dyn MediaStore>,
    folder: MediaFolder,
}

impl ProductServiceImpl {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        media: Arc<dyn MediaStore>,
        folder: MediaFolder,
    ) -> Self {
        Self {
            repository,
            media,
            folder,
        }
    }

    /// Upload every image and the chosen video.
    ///
    /// Local files are dropped (and so removed) once this returns. On failure
    /// nothing uploaded here is left behind on the media host.
    async fn upload(&self, uploads: PartitionedUploads) -> CatalogResult<UploadedMedia> {
        if uploads.ignored > 0 {
            tracing::debug!(ignored = uploads.ignored, "Ignoring extra or unsupported files");
        }

        let image_paths: Vec<&Path> = uploads.images.iter().map(|f| f.path()).collect();
        let images = self.media.upload_many(&image_paths, &self.folder).await?;

        let video = match &uploads.video {
            Some(file) => match self.media.upload(file.path(), &self.folder).await {
                Ok(stored) => Some(stored),
                Err(e) => {
                    let orphans: Vec<String> = images.into_iter().map(|m| m.media_id).collect();
                    self.discard(&orphans).await;
                    return Err(e);
                }
            },
            None => None,
        };

        tracing::debug!(
            images = images.len(),
            video = video.is_some(),
            "Uploaded product media"
        );

        Ok(UploadedMedia { images, video })
    }

    /// Best-effort removal of media no row refers to
    async fn discard(&self, media_ids: &[String]) {
        if media_ids.is_empty() {
            return;
        }
        if let Err(e) = self.media.delete_many(media_ids).await {
            tracing::warn!(
                error = %e,
                media_ids = ?media_ids,
                "Failed to remove orphaned media"
            );
        }
    }

    async fn page(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>> {
        self.repository
            .find_page(&filter.normalized(), pagination)
            .await
    }
}

#[async_trait]
impl ProductService for ProductServiceImpl {
    async fn create_product(
        &self,
        request: CreateProductRequest,
        files: Vec<UploadedFile>,
    ) -> CatalogResult<ProductDetails> {
        request.validate()?;
        let (product, colors) = request.into_parts();

        if self.repository.name_exists(&product.name).await? {
            return Err(CatalogError::conflict(format!(
                "Product with name '{}' already exists",
                product.name
            )));
        }

        let uploaded = self.upload(partition_uploads(files)).await?;
        let uploaded_ids = uploaded.media_ids();

        let aggregate = NewProductAggregate {
            product,
            images: uploaded.images,
            video: uploaded.video,
            colors,
        };

        match self.repository.create_aggregate(aggregate).await {
            Ok(details) => {
                tracing::info!(
                    product_id = %details.product.id,
                    name = %details.product.name,
                    images = details.images.len(),
                    videos = details.videos.len(),
                    colors = details.colors.len(),
                    "Created product"
                );
                Ok(details)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Product creation failed, removing uploaded media");
                self.discard(&uploaded_ids).await;
                Err(e)
            }
        }
    }

    async fn update_product(
        &self,
        id: Uuid,
        request: UpdateProductRequest,
        files: Vec<UploadedFile>,
    ) -> CatalogResult<ProductDetails> {
        request.validate()?;

        let current = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Product not found"))?;

        if let Some(name) = request.patch.new_name() {
            if name != current.product.name && self.repository.name_exists(name).await? {
                return Err(CatalogError::conflict(format!(
                    "Product with name '{}' already exists",
                    name
                )));
            }
        }

        let uploads = partition_uploads(files);
        let replace_images = !uploads.images.is_empty();
        let uploaded = self.upload(uploads).await?;
        let uploaded_ids = uploaded.media_ids();

        let changes = ProductChanges {
            patch: request.patch,
            images: replace_images.then_some(uploaded.images),
            video: uploaded.video,
            colors: request.colors,
        };

        let updated = match self.repository.update_aggregate(id, changes).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(product_id = %id, error = %e, "Product update failed, removing uploaded media");
                self.discard(&uploaded_ids).await;
                return Err(e);
            }
        };

        // Media released by the committed update is no longer referenced
        self.discard(&updated.released_media).await;

        tracing::info!(
            product_id = %id,
            released_media = updated.released_media.len(),
            "Updated product"
        );

        Ok(updated.details)
    }

    async fn delete_product(&self, id: Uuid) -> CatalogResult<()> {
        let details = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Product not found"))?;

        let media_ids = details.media_ids();
        if !media_ids.is_empty() {
            self.media.delete_many(&media_ids).await?;
        }

        if !self.repository.delete_product(id).await? {
            return Err(CatalogError::not_found("Product not found"));
        }

        tracing::info!(product_id = %id, media = media_ids.len(), "Deleted product");
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> CatalogResult<ProductDetails> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Product not found"))
    }

    async fn list_products(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>> {
        self.page(filter, pagination).await
    }

    async fn get_by_category(
        &self,
        category: &str,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>> {
        let category = category.trim();
        if category.is_empty() {
            return Err(CatalogError::validation("Category is required"));
        }

        let filter = ProductFilter {
            category: Some(category.to_string()),
            ..filter
        };
        self.page(filter, pagination).await
    }

    async fn get_by_tag(
        &self,
        tag: &str,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>> {
        let tag = normalize_tag(tag).ok_or_else(|| CatalogError::validation("Tag is required"))?;

        let filter = ProductFilter {
            tag: Some(tag),
            ..filter
        };
        self.page(filter, pagination).await
    }

    async fn get_cart_products(&self, ids: &[Uuid]) -> CatalogResult<Vec<ProductDetails>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.repository.find_by_ids(ids).await
    }
}

/// Builder for ProductServiceImpl
#[derive(Default)]
pub struct ProductServiceBuilder {
    repository: Option<Arc<dyn ProductRepository>>,
    media: Option<Arc<dyn MediaStore>>,
    folder: Option<MediaFolder>,
}

impl ProductServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repository(mut self, repository: Arc<dyn ProductRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn media(mut self, media: Arc<dyn MediaStore>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn folder(mut self, folder: MediaFolder) -> Self {
        self.folder = Some(folder);
        self
    }

    pub fn build(self) -> Result<ProductServiceImpl, &'static str> {
        let repository = self.repository.ok_or("Repository is required")?;
        let media = self.media.ok_or("Media store is required")?;

        Ok(ProductServiceImpl::new(
            repository,
            media,
            self.folder.unwrap_or_default(),
        ))
    }
}
