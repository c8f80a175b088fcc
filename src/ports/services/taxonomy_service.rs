use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::CatalogResult,
    models::{
        CreateTaxonomyRequest, TaxonomyDetails, TaxonomyEntry, TaxonomyKind,
        UpdateTaxonomyRequest,
    },
};

/// Port for CRUD over the catalog lookup tables
#[async_trait]
pub trait TaxonomyService: Send + Sync + 'static {
    async fn create(&self, kind: TaxonomyKind, request: CreateTaxonomyRequest) -> CatalogResult<TaxonomyEntry>;

    async fn list(&self, kind: TaxonomyKind) -> CatalogResult<Vec<TaxonomyEntry>>;

    /// One entry with its children (subcategories and sizes of a category)
    async fn get(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<TaxonomyDetails>;

    /// Entries of `kind` belonging to a category
    async fn list_by_category(&self, kind: TaxonomyKind, category_id: Uuid) -> CatalogResult<Vec<TaxonomyEntry>>;

    async fn update(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
        request: UpdateTaxonomyRequest,
    ) -> CatalogResult<TaxonomyEntry>;

    async fn delete(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<()>;
}
