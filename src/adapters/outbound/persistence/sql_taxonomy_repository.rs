use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::db_error::map_db_error;
use crate::{
    domain::{
        errors::CatalogResult,
        models::{TaxonomyEntry, TaxonomyKind, UpdateTaxonomyRequest},
    },
    ports::repositories::TaxonomyRepository,
};

/// Table holding the entries of a kind
pub(crate) fn table_for(kind: TaxonomyKind) -> &'static str {
    match kind {
        TaxonomyKind::Category => "categories",
        TaxonomyKind::SubCategory => "sub_categories",
        TaxonomyKind::Size => "sizes",
        TaxonomyKind::Color => "colors",
        TaxonomyKind::Quality => "qualities",
    }
}

/// PostgreSQL implementation of TaxonomyRepository
#[derive(Clone)]
pub struct SqlTaxonomyRepository {
    pool: PgPool,
}

impl SqlTaxonomyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the lookup tables
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                parent_id UUID,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS sub_categories (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                parent_id UUID NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS sizes (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                parent_id UUID REFERENCES categories(id) ON DELETE SET NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS colors (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                parent_id UUID,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS qualities (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                parent_id UUID,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE INDEX IF NOT EXISTS idx_sub_categories_parent ON sub_categories(parent_id);
            CREATE INDEX IF NOT EXISTS idx_sizes_parent ON sizes(parent_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn entry_from_row(kind: TaxonomyKind, row: &PgRow) -> Result<TaxonomyEntry, sqlx::Error> {
        Ok(TaxonomyEntry {
            id: row.try_get("id")?,
            kind,
            name: row.try_get("name")?,
            parent_id: row.try_get("parent_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn select_where(kind: TaxonomyKind, column: &str) -> String {
        format!(
            "SELECT id, name, parent_id, created_at, updated_at FROM {} WHERE {} = $1",
            table_for(kind),
            column
        )
    }
}

#[async_trait]
impl TaxonomyRepository for SqlTaxonomyRepository {
    async fn create(
        &self,
        kind: TaxonomyKind,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> CatalogResult<TaxonomyEntry> {
        let sql = format!(
            "INSERT INTO {} (id, name, parent_id) VALUES ($1, $2, $3) \
             RETURNING id, name, parent_id, created_at, updated_at",
            table_for(kind)
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, kind.label()))?;

        Self::entry_from_row(kind, &row).map_err(|e| map_db_error(e, kind.label()))
    }

    async fn find_by_id(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<Option<TaxonomyEntry>> {
        let sql = Self::select_where(kind, "id");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, kind.label()))?;

        row.map(|r| Self::entry_from_row(kind, &r))
            .transpose()
            .map_err(|e| map_db_error(e, kind.label()))
    }

    async fn find_by_name(&self, kind: TaxonomyKind, name: &str) -> CatalogResult<Option<TaxonomyEntry>> {
        let sql = Self::select_where(kind, "name");
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, kind.label()))?;

        row.map(|r| Self::entry_from_row(kind, &r))
            .transpose()
            .map_err(|e| map_db_error(e, kind.label()))
    }

    async fn list(&self, kind: TaxonomyKind) -> CatalogResult<Vec<TaxonomyEntry>> {
        let sql = format!(
            "SELECT id, name, parent_id, created_at, updated_at FROM {} ORDER BY name",
            table_for(kind)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, kind.label()))?;

        rows.iter()
            .map(|r| Self::entry_from_row(kind, r))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_db_error(e, kind.label()))
    }

    async fn list_children(&self, kind: TaxonomyKind, parent_id: Uuid) -> CatalogResult<Vec<TaxonomyEntry>> {
        let sql = format!(
            "SELECT id, name, parent_id, created_at, updated_at FROM {} \
             WHERE parent_id = $1 ORDER BY name",
            table_for(kind)
        );
        let rows = sqlx::query(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, kind.label()))?;

        rows.iter()
            .map(|r| Self::entry_from_row(kind, r))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_db_error(e, kind.label()))
    }

    async fn update(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
        request: &UpdateTaxonomyRequest,
    ) -> CatalogResult<Option<TaxonomyEntry>> {
        // $3 flags whether the parent link is being changed at all
        let sql = format!(
            "UPDATE {} SET \
                name = COALESCE($2, name), \
                parent_id = CASE WHEN $3 THEN $4 ELSE parent_id END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, name, parent_id, created_at, updated_at",
            table_for(kind)
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(request.name.as_deref())
            .bind(request.parent_id.is_some())
            .bind(request.parent_id.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, kind.label()))?;

        row.map(|r| Self::entry_from_row(kind, &r))
            .transpose()
            .map_err(|e| map_db_error(e, kind.label()))
    }

    async fn delete(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table_for(kind));
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, kind.label()))?;

        Ok(result.rows_affected() > 0)
    }
}
