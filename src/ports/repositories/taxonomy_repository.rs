use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::CatalogResult,
    models::{TaxonomyEntry, TaxonomyKind, UpdateTaxonomyRequest},
};

/// Persistence for categories, subcategories, sizes, colors and qualities
#[async_trait]
pub trait TaxonomyRepository: Send + Sync + 'static {
    /// Fails with `Conflict` when the kind already has an entry with this name
    async fn create(
        &self,
        kind: TaxonomyKind,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> CatalogResult<TaxonomyEntry>;

    async fn find_by_id(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<Option<TaxonomyEntry>>;

    async fn find_by_name(&self, kind: TaxonomyKind, name: &str) -> CatalogResult<Option<TaxonomyEntry>>;

    /// All entries of a kind, ordered by name
    async fn list(&self, kind: TaxonomyKind) -> CatalogResult<Vec<TaxonomyEntry>>;

    /// Entries of a kind whose parent is the given entry
    async fn list_children(&self, kind: TaxonomyKind, parent_id: Uuid) -> CatalogResult<Vec<TaxonomyEntry>>;

    /// Returns `None` when the entry does not exist
    async fn update(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
        request: &UpdateTaxonomyRequest,
    ) -> CatalogResult<Option<TaxonomyEntry>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<bool>;
}
