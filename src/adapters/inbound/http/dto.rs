use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::{
    errors::{CatalogError, FieldError, Validate},
    models::{
        AuthSession, Color, CreateTaxonomyRequest, LoginRequest, Page, ProductDetails,
        ProductFilter, ProductImage, ProductVideo, RegisterRequest, TaxonomyDetails,
        TaxonomyEntry, UpdateTaxonomyRequest, User,
    },
};

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error,
            timestamp: Utc::now(),
        }
    }
}

// Product responses

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDto {
    pub id: Uuid,
    pub media_id: String,
    pub url: String,
    pub rank: i32,
}

impl From<ProductImage> for ImageDto {
    fn from(image: ProductImage) -> Self {
        Self {
            id: image.id,
            media_id: image.media_id,
            url: image.url,
            rank: image.rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDto {
    pub id: Uuid,
    pub media_id: String,
    pub url: String,
}

impl From<ProductVideo> for VideoDto {
    fn from(video: ProductVideo) -> Self {
        Self {
            id: video.id,
            media_id: video.media_id,
            url: video.url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorDto {
    pub id: Uuid,
    pub name: String,
}

impl From<Color> for ColorDto {
    fn from(color: Color) -> Self {
        Self {
            id: color.id,
            name: color.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub short_description: String,
    pub detailed_description: String,
    pub price: f64,
    pub original_price: f64,
    pub discount: f64,
    pub tax: f64,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub quality_id: Option<Uuid>,
    pub size_id: Option<Uuid>,
    pub tag: Option<String>,
    pub images: Vec<ImageDto>,
    pub videos: Vec<VideoDto>,
    pub colors: Vec<ColorDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductDetails> for ProductDto {
    fn from(details: ProductDetails) -> Self {
        let product = details.product;
        Self {
            id: product.id,
            name: product.name,
            short_description: product.short_description,
            detailed_description: product.detailed_description,
            price: product.price,
            original_price: product.original_price,
            discount: product.discount,
            tax: product.tax,
            category_id: product.references.category_id,
            subcategory_id: product.references.subcategory_id,
            quality_id: product.references.quality_id,
            size_id: product.references.size_id,
            tag: product.tag,
            images: details.images.into_iter().map(Into::into).collect(),
            videos: details.videos.into_iter().map(Into::into).collect(),
            colors: details.colors.into_iter().map(Into::into).collect(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedProductsDto {
    pub products: Vec<ProductDto>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub page_size: u32,
}

impl From<Page<ProductDetails>> for PagedProductsDto {
    fn from(page: Page<ProductDetails>) -> Self {
        let total_pages = page.total_pages();
        Self {
            total: page.total,
            total_pages,
            current_page: page.page,
            page_size: page.limit,
            products: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

// Product queries

/// Query string of the generic product listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListProductsQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.clone(),
            search: self.search.clone(),
            ..Default::default()
        }
    }
}

/// Query string of storefront listings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontQuery {
    pub tag: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl StorefrontQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            size: self.size.clone(),
            color: self.color.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartProductsDto {
    #[serde(default)]
    pub ids: Vec<String>,
}

impl CartProductsDto {
    /// Parse the ids, rejecting the whole request if any is malformed
    pub fn parse_ids(&self) -> Result<Vec<Uuid>, CatalogError> {
        let mut ids = Vec::with_capacity(self.ids.len());
        for raw in &self.ids {
            let id = Uuid::parse_str(raw.trim()).map_err(|_| {
                CatalogError::from(vec![FieldError::new(
                    "ids",
                    format!("'{}' is not a valid product id", raw),
                )])
            })?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

impl Validate for CartProductsDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        match self.parse_ids() {
            Ok(_) => Ok(()),
            Err(CatalogError::Validation { fields, .. }) => Err(fields),
            Err(e) => Err(vec![FieldError::new("ids", e.to_string())]),
        }
    }
}

// Taxonomy

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyDto {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaxonomyEntry> for TaxonomyDto {
    fn from(entry: TaxonomyEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            parent_id: entry.parent_id,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyDetailsDto {
    #[serde(flatten)]
    pub entry: TaxonomyDto,
    pub children: Vec<TaxonomyDto>,
}

impl From<TaxonomyDetails> for TaxonomyDetailsDto {
    fn from(details: TaxonomyDetails) -> Self {
        Self {
            entry: details.entry.into(),
            children: details.children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaxonomyDto {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "categoryId", alias = "parentCategoryId")]
    pub parent_id: Option<Uuid>,
}

impl From<CreateTaxonomyDto> for CreateTaxonomyRequest {
    fn from(dto: CreateTaxonomyDto) -> Self {
        Self {
            name: dto.name,
            parent_id: dto.parent_id,
        }
    }
}

impl Validate for CreateTaxonomyDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        CreateTaxonomyRequest::from(self.clone()).validate()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaxonomyDto {
    pub name: Option<String>,
    /// Absent leaves the link alone, `null` clears it
    #[serde(
        default,
        alias = "categoryId",
        alias = "parentCategoryId",
        deserialize_with = "double_option"
    )]
    pub parent_id: Option<Option<Uuid>>,
}

impl From<UpdateTaxonomyDto> for UpdateTaxonomyRequest {
    fn from(dto: UpdateTaxonomyDto) -> Self {
        Self {
            name: dto.name,
            parent_id: dto.parent_id,
        }
    }
}

impl Validate for UpdateTaxonomyDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        UpdateTaxonomyRequest::from(self.clone()).validate()
    }
}

/// Distinguish an explicit `null` from an absent field
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Identity

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub phone: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            phone: user.phone,
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponseDto {
    pub user: UserDto,
    pub token: String,
}

impl From<AuthSession> for AuthResponseDto {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.token,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub phone: String,
}

impl From<RegisterDto> for RegisterRequest {
    fn from(dto: RegisterDto) -> Self {
        Self {
            email: dto.email,
            password: dto.password,
            username: dto.username,
            phone: dto.phone,
        }
    }
}

impl Validate for RegisterDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        RegisterRequest::from(self.clone()).validate()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<LoginDto> for LoginRequest {
    fn from(dto: LoginDto) -> Self {
        Self {
            email: dto.email,
            password: dto.password,
        }
    }
}

impl Validate for LoginDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        LoginRequest::from(self.clone()).validate()
    }
}

/// Liveness payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}
