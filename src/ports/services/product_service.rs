use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::CatalogResult,
    models::{
        CreateProductRequest, Page, Pagination, ProductDetails, ProductFilter,
        UpdateProductRequest, UploadedFile,
    },
};

/// Port for the product aggregate: validated writes that keep a product, its
/// media and its color links consistent, plus storefront queries
#[async_trait]
pub trait ProductService: Send + Sync + 'static {
    /// Create a product from form fields and uploaded files
    async fn create_product(
        &self,
        request: CreateProductRequest,
        files: Vec<UploadedFile>,
    ) -> CatalogResult<ProductDetails>;

    /// Partially update a product; supplied images, video and colors replace
    /// the existing sets
    async fn update_product(
        &self,
        id: Uuid,
        request: UpdateProductRequest,
        files: Vec<UploadedFile>,
    ) -> CatalogResult<ProductDetails>;

    /// Delete a product and its remote media
    async fn delete_product(&self, id: Uuid) -> CatalogResult<()>;

    async fn get_product(&self, id: Uuid) -> CatalogResult<ProductDetails>;

    /// Generic listing filtered by category name and name search
    async fn list_products(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>>;

    /// Storefront listing for one category
    async fn get_by_category(
        &self,
        category: &str,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>>;

    /// Storefront listing for one tag
    async fn get_by_tag(
        &self,
        tag: &str,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>>;

    /// Batch fetch for a shopping cart
    async fn get_cart_products(&self, ids: &[Uuid]) -> CatalogResult<Vec<ProductDetails>>;
}
