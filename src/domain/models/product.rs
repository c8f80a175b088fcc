use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    errors::{FieldError, FieldErrors, Validate},
    models::StoredMedia,
    value_objects::ColorName,
};

/// A catalog product row
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub short_description: String,
    pub detailed_description: String,
    pub price: f64,
    pub original_price: f64,
    pub discount: f64,
    pub tax: f64,
    pub references: ProductReferences,
    /// Storefront classification, stored lower-cased
    pub tag: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Links from a product to taxonomy entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductReferences {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub quality_id: Option<Uuid>,
    pub size_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub media_id: String,
    pub url: String,
    /// 1-based display position
    pub rank: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductVideo {
    pub id: Uuid,
    pub product_id: Uuid,
    pub media_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    pub id: Uuid,
    pub name: String,
}

/// A product with its images (rank ascending), videos and colors
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub product: Product,
    pub images: Vec<ProductImage>,
    pub videos: Vec<ProductVideo>,
    pub colors: Vec<Color>,
}

impl ProductDetails {
    /// Distinct media ids owned by this product, images first
    pub fn media_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        let owned = self
            .images
            .iter()
            .map(|i| &i.media_id)
            .chain(self.videos.iter().map(|v| &v.media_id));

        for id in owned {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }

    pub fn color_names(&self) -> Vec<&str> {
        self.colors.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Request to create a product
#[derive(Debug, Clone, Default)]
pub struct CreateProductRequest {
    pub name: String,
    pub short_description: String,
    pub detailed_description: String,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount: Option<f64>,
    pub tax: Option<f64>,
    pub references: ProductReferences,
    pub tag: Option<String>,
    pub colors: Vec<ColorName>,
}

impl Validate for CreateProductRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.require("shortDescription", &self.short_description);
        errors.require("detailedDescription", &self.detailed_description);

        if self.price.is_none() {
            errors.push(FieldError::required("price"));
        }
        if self.original_price.is_none() {
            errors.push(FieldError::required("originalPrice"));
        }

        check_amounts(
            &mut errors,
            [
                ("price", self.price),
                ("originalPrice", self.original_price),
                ("discount", self.discount),
                ("tax", self.tax),
            ],
        );

        errors.into_result()
    }
}

impl CreateProductRequest {
    /// Split into the row to insert and the requested colors.
    ///
    /// Call after `validate`; absent amounts become zero.
    pub fn into_parts(self) -> (NewProduct, Vec<ColorName>) {
        let product = NewProduct {
            name: self.name.trim().to_string(),
            short_description: self.short_description,
            detailed_description: self.detailed_description,
            price: self.price.unwrap_or_default(),
            original_price: self.original_price.unwrap_or_default(),
            discount: self.discount.unwrap_or_default(),
            tax: self.tax.unwrap_or_default(),
            references: self.references,
            tag: self.tag.and_then(|t| normalize_tag(&t)),
        };
        (product, self.colors)
    }
}

/// A product row ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub short_description: String,
    pub detailed_description: String,
    pub price: f64,
    pub original_price: f64,
    pub discount: f64,
    pub tax: f64,
    pub references: ProductReferences,
    pub tag: Option<String>,
}

/// Everything inserted when a product is created
#[derive(Debug, Clone)]
pub struct NewProductAggregate {
    pub product: NewProduct,
    /// Uploaded images in rank order
    pub images: Vec<StoredMedia>,
    pub video: Option<StoredMedia>,
    pub colors: Vec<ColorName>,
}

/// Field changes for a partial update.
///
/// `None` leaves a field untouched. For references and the tag,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub detailed_description: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount: Option<f64>,
    pub tax: Option<f64>,
    pub category_id: Option<Option<Uuid>>,
    pub subcategory_id: Option<Option<Uuid>>,
    pub quality_id: Option<Option<Uuid>>,
    pub size_id: Option<Option<Uuid>>,
    pub tag: Option<Option<String>>,
}

impl ProductPatch {
    /// Apply the supplied fields to a product row
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = non_blank(&self.name) {
            product.name = name.trim().to_string();
        }
        if let Some(text) = non_blank(&self.short_description) {
            product.short_description = text.to_string();
        }
        if let Some(text) = non_blank(&self.detailed_description) {
            product.detailed_description = text.to_string();
        }
        // Amounts are presence-based: an explicit zero is applied
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(original_price) = self.original_price {
            product.original_price = original_price;
        }
        if let Some(discount) = self.discount {
            product.discount = discount;
        }
        if let Some(tax) = self.tax {
            product.tax = tax;
        }
        if let Some(category_id) = self.category_id {
            product.references.category_id = category_id;
        }
        if let Some(subcategory_id) = self.subcategory_id {
            product.references.subcategory_id = subcategory_id;
        }
        if let Some(quality_id) = self.quality_id {
            product.references.quality_id = quality_id;
        }
        if let Some(size_id) = self.size_id {
            product.references.size_id = size_id;
        }
        if let Some(tag) = &self.tag {
            product.tag = tag.as_deref().and_then(normalize_tag);
        }
    }

    /// The new name, if this patch renames the product
    pub fn new_name(&self) -> Option<&str> {
        non_blank(&self.name).map(str::trim)
    }
}

/// Request to update a product
#[derive(Debug, Clone, Default)]
pub struct UpdateProductRequest {
    pub patch: ProductPatch,
    /// Replacement color set, when supplied
    pub colors: Option<Vec<ColorName>>,
}

impl Validate for UpdateProductRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = FieldErrors::new();
        check_amounts(
            &mut errors,
            [
                ("price", self.patch.price),
                ("originalPrice", self.patch.original_price),
                ("discount", self.patch.discount),
                ("tax", self.patch.tax),
            ],
        );
        errors.into_result()
    }
}

/// Aggregate changes applied by the repository in one transaction
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub patch: ProductPatch,
    /// Full replacement image set, in rank order
    pub images: Option<Vec<StoredMedia>>,
    /// Replacement video; prior videos are removed
    pub video: Option<StoredMedia>,
    /// Full replacement color set
    pub colors: Option<Vec<ColorName>>,
}

/// Result of an aggregate update
#[derive(Debug, Clone)]
pub struct UpdatedProduct {
    pub details: ProductDetails,
    /// Media ids whose rows were removed by the update
    pub released_media: Vec<String>,
}

/// Lower-case and trim a tag; blank tags are dropped
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn check_amounts<const N: usize>(errors: &mut FieldErrors, amounts: [(&str, Option<f64>); N]) {
    for (field, amount) in amounts {
        if let Some(value) = amount {
            if !value.is_finite() || value < 0.0 {
                errors.push(FieldError::new(
                    field,
                    format!("{} must be a non-negative number", field),
                ));
            }
        }
    }
}
