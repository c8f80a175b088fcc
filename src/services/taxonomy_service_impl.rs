use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        errors::{CatalogError, CatalogResult, Validate},
        models::{
            CreateTaxonomyRequest, TaxonomyDetails, TaxonomyEntry, TaxonomyKind,
            UpdateTaxonomyRequest,
        },
    },
    ports::{repositories::TaxonomyRepository, services::TaxonomyService},
};

/// Implementation of TaxonomyService over a TaxonomyRepository
#[derive(Clone)]
pub struct TaxonomyServiceImpl {
    repository: Arc<dyn TaxonomyRepository>,
}

impl TaxonomyServiceImpl {
    pub fn new(repository: Arc<dyn TaxonomyRepository>) -> Self {
        Self { repository }
    }

    fn not_found(kind: TaxonomyKind) -> CatalogError {
        CatalogError::not_found(format!("{} not found", kind.label()))
    }

    /// Check that a parent link points at an existing entry of the right kind
    async fn check_parent(&self, kind: TaxonomyKind, parent_id: Option<Uuid>) -> CatalogResult<()> {
        let Some(parent_kind) = kind.parent_kind() else {
            if parent_id.is_some() {
                return Err(CatalogError::validation(format!(
                    "{} entries have no parent",
                    kind.label()
                )));
            }
            return Ok(());
        };

        match parent_id {
            Some(id) => {
                if self.repository.find_by_id(parent_kind, id).await?.is_none() {
                    return Err(Self::not_found(parent_kind));
                }
                Ok(())
            }
            None if kind.requires_parent() => Err(CatalogError::validation(format!(
                "{} requires a parent {}",
                kind.label(),
                parent_kind.label().to_lowercase()
            ))),
            None => Ok(()),
        }
    }

    async fn ensure_name_free(&self, kind: TaxonomyKind, name: &str, own_id: Option<Uuid>) -> CatalogResult<()> {
        if let Some(existing) = self.repository.find_by_name(kind, name).await? {
            if Some(existing.id) != own_id {
                return Err(CatalogError::conflict(format!(
                    "{} '{}' already exists",
                    kind.label(),
                    name
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TaxonomyService for TaxonomyServiceImpl {
    async fn create(&self, kind: TaxonomyKind, request: CreateTaxonomyRequest) -> CatalogResult<TaxonomyEntry> {
        request.validate()?;
        let name = request.name.trim();

        self.ensure_name_free(kind, name, None).await?;
        self.check_parent(kind, request.parent_id).await?;

        let entry = self.repository.create(kind, name, request.parent_id).await?;
        tracing::info!(kind = %kind, id = %entry.id, name = %entry.name, "Created taxonomy entry");
        Ok(entry)
    }

    async fn list(&self, kind: TaxonomyKind) -> CatalogResult<Vec<TaxonomyEntry>> {
        self.repository.list(kind).await
    }

    async fn get(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<TaxonomyDetails> {
        let entry = self
            .repository
            .find_by_id(kind, id)
            .await?
            .ok_or_else(|| Self::not_found(kind))?;

        let mut children = Vec::new();
        for child_kind in TaxonomyKind::ALL {
            if child_kind.parent_kind() == Some(kind) {
                children.extend(self.repository.list_children(child_kind, id).await?);
            }
        }

        Ok(TaxonomyDetails { entry, children })
    }

    async fn list_by_category(&self, kind: TaxonomyKind, category_id: Uuid) -> CatalogResult<Vec<TaxonomyEntry>> {
        if kind.parent_kind() != Some(TaxonomyKind::Category) {
            return Err(CatalogError::validation(format!(
                "{} entries do not belong to a category",
                kind.label()
            )));
        }
        self.repository.list_children(kind, category_id).await
    }

    async fn update(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
        request: UpdateTaxonomyRequest,
    ) -> CatalogResult<TaxonomyEntry> {
        request.validate()?;

        if self.repository.find_by_id(kind, id).await?.is_none() {
            return Err(Self::not_found(kind));
        }

        let request = UpdateTaxonomyRequest {
            name: request.name.map(|n| n.trim().to_string()),
            parent_id: request.parent_id,
        };

        if let Some(name) = &request.name {
            self.ensure_name_free(kind, name, Some(id)).await?;
        }
        if let Some(parent_id) = request.parent_id {
            self.check_parent(kind, parent_id).await?;
        }

        self.repository
            .update(kind, id, &request)
            .await?
            .ok_or_else(|| Self::not_found(kind))
    }

    async fn delete(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<()> {
        if !self.repository.delete(kind, id).await? {
            return Err(Self::not_found(kind));
        }
        tracing::info!(kind = %kind, id = %id, "Deleted taxonomy entry");
        Ok(())
    }
}
