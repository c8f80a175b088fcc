use axum::extract::{FromRequest, Multipart, Request};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{
    adapters::inbound::http::{error::ApiError, router::AppState},
    domain::{
        errors::{CatalogError, FieldError},
        models::{
            normalize_tag, CreateProductRequest, MediaKind, ProductPatch, ProductReferences,
            UpdateProductRequest, UploadedFile,
        },
        value_objects::ColorName,
    },
};

/// A product form: text fields plus files parked in the upload directory.
///
/// Files are removed from disk when the form (or the `UploadedFile`s taken
/// from it) is dropped.
#[derive(Debug, Default)]
pub struct ProductForm {
    fields: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

impl FromRequest<AppState> for ProductForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| CatalogError::validation(format!("Invalid multipart body: {}", e.body_text())))?;

        let upload_dir = &state.config.upload_dir;
        let max_images = state.config.max_images;
        let mut form = ProductForm::default();
        let mut images = 0usize;

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| CatalogError::validation(format!("Invalid multipart body: {}", e.body_text())))?
        {
            let name = field.name().unwrap_or_default().to_string();

            let Some(file_name) = field.file_name().map(str::to_string) else {
                let value = field.text().await.map_err(|e| {
                    CatalogError::validation(format!("Invalid form field '{}': {}", name, e.body_text()))
                })?;
                form.fields.push((name, value));
                continue;
            };

            let content_type = field
                .content_type()
                .map(str::to_string)
                .or_else(|| mime_guess::from_path(&file_name).first_raw().map(str::to_string))
                .unwrap_or_default();

            match MediaKind::from_content_type(&content_type) {
                Some(MediaKind::Image) => {
                    images += 1;
                    if images > max_images {
                        return Err(CatalogError::validation(format!(
                            "Too many images (max {})",
                            max_images
                        ))
                        .into());
                    }
                }
                Some(MediaKind::Video) => {}
                None => {
                    return Err(CatalogError::validation(format!(
                        "Only image and video files are allowed, got '{}'",
                        content_type
                    ))
                    .into())
                }
            }

            let suffix = file_suffix(&file_name, &content_type);
            let (file, path) = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(&suffix)
                .tempfile_in(upload_dir)
                .map_err(|e| CatalogError::internal(format!("Failed to create upload file: {}", e)))?
                .into_parts();

            let mut file = tokio::fs::File::from_std(file);
            while let Some(chunk) = field.chunk().await.map_err(|e| {
                CatalogError::validation(format!("Upload of '{}' failed: {}", file_name, e.body_text()))
            })? {
                file.write_all(&chunk)
                    .await
                    .map_err(|e| CatalogError::internal(format!("Failed to write upload: {}", e)))?;
            }
            file.flush()
                .await
                .map_err(|e| CatalogError::internal(format!("Failed to write upload: {}", e)))?;

            form.files.push(UploadedFile::new(path, content_type, file_name));
        }

        Ok(form)
    }
}

/// `.ext` from the client file name, else from the content type
fn file_suffix(file_name: &str, content_type: &str) -> String {
    let from_name = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);

    let extension = from_name.or_else(|| {
        mime_guess::get_mime_extensions_str(content_type)
            .and_then(|exts| exts.first())
            .map(|e| e.to_string())
    });

    extension.map(|e| format!(".{}", e)).unwrap_or_default()
}

impl ProductForm {
    pub fn new(fields: Vec<(String, String)>, files: Vec<UploadedFile>) -> Self {
        Self { fields, files }
    }

    /// Last value sent for a field
    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    fn colors(&self, errors: &mut Vec<FieldError>) -> Option<Vec<ColorName>> {
        let values: Vec<&str> = self
            .fields
            .iter()
            .filter(|(n, _)| n == "colors" || n == "colors[]")
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
            .collect();

        if !self.has("colors") && !self.has("colors[]") {
            return None;
        }

        match ColorName::parse_all(values) {
            Ok(names) => Some(names),
            Err(e) => {
                errors.push(e);
                Some(Vec::new())
            }
        }
    }

    /// A non-blank number, or an error naming the field
    fn number(&self, name: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
        let raw = self.text(name)?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.push(FieldError::new(name, format!("{} must be a number", name)));
                None
            }
        }
    }

    /// `None` when absent, `Some(None)` when sent blank
    fn reference(&self, name: &str, errors: &mut Vec<FieldError>) -> Option<Option<Uuid>> {
        let raw = self.text(name)?.trim();
        if raw.is_empty() || raw == "null" {
            return Some(None);
        }
        match Uuid::parse_str(raw) {
            Ok(id) => Some(Some(id)),
            Err(_) => {
                errors.push(FieldError::new(name, format!("{} must be a valid id", name)));
                Some(None)
            }
        }
    }

    pub fn into_create_request(self) -> Result<(CreateProductRequest, Vec<UploadedFile>), ApiError> {
        let mut errors = Vec::new();
        let text = |name: &str| self.text(name).unwrap_or_default().to_string();

        let request = CreateProductRequest {
            name: text("name"),
            short_description: text("shortDescription"),
            detailed_description: text("detailedDescription"),
            price: self.number("price", &mut errors),
            original_price: self.number("originalPrice", &mut errors),
            discount: self.number("discount", &mut errors),
            tax: self.number("tax", &mut errors),
            references: ProductReferences {
                category_id: self.reference("categoryId", &mut errors).flatten(),
                subcategory_id: self.reference("subcategoryId", &mut errors).flatten(),
                quality_id: self.reference("qualityId", &mut errors).flatten(),
                size_id: self.reference("sizeId", &mut errors).flatten(),
            },
            tag: self.text("tag").and_then(normalize_tag),
            colors: self.colors(&mut errors).unwrap_or_default(),
        };

        if !errors.is_empty() {
            return Err(errors.into());
        }
        Ok((request, self.files))
    }

    pub fn into_update_request(self) -> Result<(UpdateProductRequest, Vec<UploadedFile>), ApiError> {
        let mut errors = Vec::new();
        let text = |name: &str| self.text(name).map(str::to_string);

        let patch = ProductPatch {
            name: text("name"),
            short_description: text("shortDescription"),
            detailed_description: text("detailedDescription"),
            price: self.number("price", &mut errors),
            original_price: self.number("originalPrice", &mut errors),
            discount: self.number("discount", &mut errors),
            tax: self.number("tax", &mut errors),
            category_id: self.reference("categoryId", &mut errors),
            subcategory_id: self.reference("subcategoryId", &mut errors),
            quality_id: self.reference("qualityId", &mut errors),
            size_id: self.reference("sizeId", &mut errors),
            tag: self.text("tag").map(normalize_tag),
        };
        let colors = self.colors(&mut errors);

        if !errors.is_empty() {
            return Err(errors.into());
        }
        Ok((UpdateProductRequest { patch, colors }, self.files))
    }
}
