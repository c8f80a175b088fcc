use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::{FieldError, FieldErrors, Validate};

const MAX_NAME_LEN: usize = 100;

/// The simple named lookup tables products refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyKind {
    Category,
    SubCategory,
    Size,
    Color,
    Quality,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 5] = [
        TaxonomyKind::Category,
        TaxonomyKind::SubCategory,
        TaxonomyKind::Size,
        TaxonomyKind::Color,
        TaxonomyKind::Quality,
    ];

    /// Human-readable name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "Category",
            TaxonomyKind::SubCategory => "Subcategory",
            TaxonomyKind::Size => "Size",
            TaxonomyKind::Color => "Color",
            TaxonomyKind::Quality => "Quality",
        }
    }

    /// The kind an entry's parent link points to
    pub fn parent_kind(&self) -> Option<TaxonomyKind> {
        match self {
            TaxonomyKind::SubCategory | TaxonomyKind::Size => Some(TaxonomyKind::Category),
            _ => None,
        }
    }

    pub fn requires_parent(&self) -> bool {
        matches!(self, TaxonomyKind::SubCategory)
    }
}

impl std::fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyEntry {
    pub id: Uuid,
    pub kind: TaxonomyKind,
    pub name: String,
    /// Owning category for subcategories and sizes
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An entry together with the entries that name it as parent
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyDetails {
    pub entry: TaxonomyEntry,
    pub children: Vec<TaxonomyEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateTaxonomyRequest {
    pub name: String,
    pub parent_id: Option<Uuid>,
}

impl Validate for CreateTaxonomyRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        if !self.name.trim().is_empty() {
            errors.check_len("name", self.name.trim(), 1, MAX_NAME_LEN);
        }
        errors.into_result()
    }
}

/// Partial update; `parent_id: Some(None)` detaches the entry
#[derive(Debug, Clone, Default)]
pub struct UpdateTaxonomyRequest {
    pub name: Option<String>,
    pub parent_id: Option<Option<Uuid>>,
}

impl Validate for UpdateTaxonomyRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.require("name", name);
            if !name.trim().is_empty() {
                errors.check_len("name", name.trim(), 1, MAX_NAME_LEN);
            }
        }
        errors.into_result()
    }
}
