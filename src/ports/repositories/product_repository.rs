use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::CatalogResult,
    models::{
        NewProductAggregate, Page, Pagination, ProductChanges, ProductDetails, ProductFilter,
        UpdatedProduct,
    },
};

/// Persistence for the product aggregate: the product row, its images,
/// videos and color links.
///
/// Every write method is atomic. Either all rows it touches are committed or
/// none are.
#[async_trait]
pub trait ProductRepository: Send + Sync + 'static {
    /// Insert a product with its images (ranked in the given order), video
    /// and colors. Unknown color names are created.
    ///
    /// Fails with `Conflict` when the name is taken.
    async fn create_aggregate(&self, aggregate: NewProductAggregate) -> CatalogResult<ProductDetails>;

    /// Apply field changes and replace the image, video and color sets that
    /// are supplied.
    ///
    /// Fails with `NotFound` when the product does not exist.
    async fn update_aggregate(&self, id: Uuid, changes: ProductChanges) -> CatalogResult<UpdatedProduct>;

    /// Delete a product; owned image and video rows go with it.
    /// Returns false when nothing was deleted.
    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool>;

    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<ProductDetails>>;

    async fn name_exists(&self, name: &str) -> CatalogResult<bool>;

    /// Filtered listing, newest first
    async fn find_page(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>>;

    /// Products with the given ids, newest first; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[Uuid]) -> CatalogResult<Vec<ProductDetails>>;
}
