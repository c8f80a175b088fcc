use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    domain::{
        errors::{CatalogError, CatalogResult},
        models::{
            Color, NewProductAggregate, Page, Pagination, Product, ProductChanges,
            ProductDetails, ProductFilter, ProductImage, ProductReferences, ProductVideo,
            StoredMedia, TaxonomyEntry, TaxonomyKind, UpdateTaxonomyRequest, UpdatedProduct,
        },
        value_objects::ColorName,
    },
    ports::repositories::{ProductRepository, TaxonomyRepository},
};

/// In-memory catalog store for testing and development.
///
/// Products and taxonomy share one lock so that aggregate writes can check
/// references and resolve colors atomically. Writes are applied to a copy
/// which replaces the live data only when every step succeeded.
#[derive(Clone, Default)]
pub struct InMemoryCatalogRepository {
    data: Arc<RwLock<CatalogData>>,
}

#[derive(Clone, Default)]
struct CatalogData {
    /// Insertion order
    products: Vec<Product>,
    images: Vec<ProductImage>,
    videos: Vec<ProductVideo>,
    /// (product id, color id)
    product_colors: Vec<(Uuid, Uuid)>,
    taxonomy: HashMap<TaxonomyKind, Vec<TaxonomyEntry>>,
}

impl CatalogData {
    fn entries(&self, kind: TaxonomyKind) -> &[TaxonomyEntry] {
        self.taxonomy.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn entry(&self, kind: TaxonomyKind, id: Uuid) -> Option<&TaxonomyEntry> {
        self.entries(kind).iter().find(|e| e.id == id)
    }

    fn entry_name(&self, kind: TaxonomyKind, id: Option<Uuid>) -> Option<&str> {
        id.and_then(|id| self.entry(kind, id))
            .map(|e| e.name.as_str())
    }

    fn product_index(&self, id: Uuid) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }

    fn name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.products
            .iter()
            .any(|p| p.name == name && Some(p.id) != except)
    }

    fn check_references(&self, references: &ProductReferences) -> CatalogResult<()> {
        let links = [
            (TaxonomyKind::Category, references.category_id),
            (TaxonomyKind::SubCategory, references.subcategory_id),
            (TaxonomyKind::Quality, references.quality_id),
            (TaxonomyKind::Size, references.size_id),
        ];

        for (kind, id) in links {
            if let Some(id) = id {
                if self.entry(kind, id).is_none() {
                    return Err(CatalogError::validation(format!(
                        "Referenced {} does not exist",
                        kind.label().to_lowercase()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Find colors by name, creating the missing ones
    fn resolve_colors(&mut self, names: &[ColorName]) -> Vec<Uuid> {
        let now = Utc::now();
        let mut ids = Vec::with_capacity(names.len());

        for name in names {
            let colors = self.taxonomy.entry(TaxonomyKind::Color).or_default();
            let id = match colors.iter().find(|c| c.name == name.as_str()) {
                Some(existing) => existing.id,
                None => {
                    let entry = TaxonomyEntry {
                        id: Uuid::new_v4(),
                        kind: TaxonomyKind::Color,
                        name: name.as_str().to_string(),
                        parent_id: None,
                        created_at: now,
                        updated_at: now,
                    };
                    let id = entry.id;
                    colors.push(entry);
                    id
                }
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    fn link_colors(&mut self, product_id: Uuid, names: &[ColorName]) {
        self.product_colors.retain(|(p, _)| *p != product_id);
        for color_id in self.resolve_colors(names) {
            self.product_colors.push((product_id, color_id));
        }
    }

    fn insert_images(&mut self, product_id: Uuid, images: Vec<StoredMedia>) {
        for (idx, media) in images.into_iter().enumerate() {
            self.images.push(ProductImage {
                id: Uuid::new_v4(),
                product_id,
                media_id: media.media_id,
                url: media.url,
                rank: idx as i32 + 1,
            });
        }
    }

    fn insert_video(&mut self, product_id: Uuid, media: StoredMedia) {
        self.videos.push(ProductVideo {
            id: Uuid::new_v4(),
            product_id,
            media_id: media.media_id,
            url: media.url,
        });
    }

    fn details(&self, product: &Product) -> ProductDetails {
        let mut images: Vec<ProductImage> = self
            .images
            .iter()
            .filter(|i| i.product_id == product.id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.rank);

        let videos = self
            .videos
            .iter()
            .filter(|v| v.product_id == product.id)
            .cloned()
            .collect();

        let mut colors: Vec<Color> = self
            .product_colors
            .iter()
            .filter(|(p, _)| *p == product.id)
            .filter_map(|(_, c)| self.entry(TaxonomyKind::Color, *c))
            .map(|c| Color {
                id: c.id,
                name: c.name.clone(),
            })
            .collect();
        colors.sort_by(|a, b| a.name.cmp(&b.name));

        ProductDetails {
            product: product.clone(),
            images,
            videos,
            colors,
        }
    }

    fn matches(&self, product: &Product, filter: &ProductFilter) -> bool {
        let name_is = |kind: TaxonomyKind, id: Option<Uuid>, wanted: &Option<String>| match wanted {
            None => true,
            Some(wanted) => self
                .entry_name(kind, id)
                .is_some_and(|name| name.to_lowercase() == wanted.to_lowercase()),
        };

        if !name_is(TaxonomyKind::Category, product.references.category_id, &filter.category) {
            return false;
        }
        if !name_is(TaxonomyKind::Size, product.references.size_id, &filter.size) {
            return false;
        }
        if let Some(tag) = &filter.tag {
            if product.tag.as_deref() != Some(tag.to_lowercase().as_str()) {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            if !product.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(color) = &filter.color {
            let color = color.to_lowercase();
            let has_color = self
                .product_colors
                .iter()
                .filter(|(p, _)| *p == product.id)
                .filter_map(|(_, c)| self.entry(TaxonomyKind::Color, *c))
                .any(|c| c.name.to_lowercase() == color);
            if !has_color {
                return false;
            }
        }
        filter.price_matches(product.price)
    }

    /// Products newest first; ties keep the most recently inserted first
    fn newest_first<'a>(&'a self, products: impl Iterator<Item = &'a Product>) -> Vec<&'a Product> {
        let mut sorted: Vec<&Product> = products.collect();
        sorted.reverse();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalogRepository {
    async fn create_aggregate(&self, aggregate: NewProductAggregate) -> CatalogResult<ProductDetails> {
        let mut data = self.data.write().await;
        let mut draft = data.clone();

        let NewProductAggregate {
            product,
            images,
            video,
            colors,
        } = aggregate;

        if draft.name_taken(&product.name, None) {
            return Err(CatalogError::conflict(format!(
                "Product with name '{}' already exists",
                product.name
            )));
        }
        draft.check_references(&product.references)?;

        let now = Utc::now();
        let row = Product {
            id: Uuid::new_v4(),
            name: product.name,
            short_description: product.short_description,
            detailed_description: product.detailed_description,
            price: product.price,
            original_price: product.original_price,
            discount: product.discount,
            tax: product.tax,
            references: product.references,
            tag: product.tag,
            created_at: now,
            updated_at: now,
        };
        let id = row.id;
        draft.products.push(row);

        draft.insert_images(id, images);
        if let Some(video) = video {
            draft.insert_video(id, video);
        }
        draft.link_colors(id, &colors);

        *data = draft;
        let product = data
            .products
            .last()
            .ok_or_else(|| CatalogError::internal("Inserted product missing"))?;
        Ok(data.details(product))
    }

    async fn update_aggregate(&self, id: Uuid, changes: ProductChanges) -> CatalogResult<UpdatedProduct> {
        let mut data = self.data.write().await;
        let mut draft = data.clone();

        let index = draft
            .product_index(id)
            .ok_or_else(|| CatalogError::not_found("Product not found"))?;

        let mut product = draft.products[index].clone();
        changes.patch.apply(&mut product);
        if draft.name_taken(&product.name, Some(id)) {
            return Err(CatalogError::conflict(format!(
                "Product with name '{}' already exists",
                product.name
            )));
        }
        draft.check_references(&product.references)?;
        product.updated_at = Utc::now();
        draft.products[index] = product;

        let mut released_media = Vec::new();

        if let Some(images) = changes.images {
            draft.images.retain(|i| {
                if i.product_id == id {
                    released_media.push(i.media_id.clone());
                    false
                } else {
                    true
                }
            });
            draft.insert_images(id, images);
        }

        if let Some(video) = changes.video {
            draft.videos.retain(|v| {
                if v.product_id == id {
                    released_media.push(v.media_id.clone());
                    false
                } else {
                    true
                }
            });
            draft.insert_video(id, video);
        }

        if let Some(colors) = changes.colors {
            draft.link_colors(id, &colors);
        }

        let mut distinct = Vec::with_capacity(released_media.len());
        for media_id in released_media {
            if !distinct.contains(&media_id) {
                distinct.push(media_id);
            }
        }

        *data = draft;
        let details = data.details(&data.products[index]);
        Ok(UpdatedProduct {
            details,
            released_media: distinct,
        })
    }

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool> {
        let mut data = self.data.write().await;
        let Some(index) = data.product_index(id) else {
            return Ok(false);
        };

        data.products.remove(index);
        data.images.retain(|i| i.product_id != id);
        data.videos.retain(|v| v.product_id != id);
        data.product_colors.retain(|(p, _)| *p != id);
        Ok(true)
    }

    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<ProductDetails>> {
        let data = self.data.read().await;
        Ok(data
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| data.details(p)))
    }

    async fn name_exists(&self, name: &str) -> CatalogResult<bool> {
        let data = self.data.read().await;
        Ok(data.name_taken(name, None))
    }

    async fn find_page(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>> {
        let data = self.data.read().await;
        let matching = data.newest_first(data.products.iter().filter(|p| data.matches(p, filter)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .map(|p| data.details(p))
            .collect();

        Ok(Page::new(items, total, pagination))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> CatalogResult<Vec<ProductDetails>> {
        let data = self.data.read().await;
        let found = data.newest_first(data.products.iter().filter(|p| ids.contains(&p.id)));
        Ok(found.into_iter().map(|p| data.details(p)).collect())
    }
}

#[async_trait]
impl TaxonomyRepository for InMemoryCatalogRepository {
    async fn create(
        &self,
        kind: TaxonomyKind,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> CatalogResult<TaxonomyEntry> {
        let mut data = self.data.write().await;
        let entries = data.taxonomy.entry(kind).or_default();

        if entries.iter().any(|e| e.name == name) {
            return Err(CatalogError::conflict(format!(
                "{} '{}' already exists",
                kind.label(),
                name
            )));
        }

        let now = Utc::now();
        let entry = TaxonomyEntry {
            id: Uuid::new_v4(),
            kind,
            name: name.to_string(),
            parent_id,
            created_at: now,
            updated_at: now,
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_id(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<Option<TaxonomyEntry>> {
        let data = self.data.read().await;
        Ok(data.entry(kind, id).cloned())
    }

    async fn find_by_name(&self, kind: TaxonomyKind, name: &str) -> CatalogResult<Option<TaxonomyEntry>> {
        let data = self.data.read().await;
        Ok(data.entries(kind).iter().find(|e| e.name == name).cloned())
    }

    async fn list(&self, kind: TaxonomyKind) -> CatalogResult<Vec<TaxonomyEntry>> {
        let data = self.data.read().await;
        let mut entries = data.entries(kind).to_vec();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn list_children(&self, kind: TaxonomyKind, parent_id: Uuid) -> CatalogResult<Vec<TaxonomyEntry>> {
        let data = self.data.read().await;
        let mut entries: Vec<TaxonomyEntry> = data
            .entries(kind)
            .iter()
            .filter(|e| e.parent_id == Some(parent_id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn update(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
        request: &UpdateTaxonomyRequest,
    ) -> CatalogResult<Option<TaxonomyEntry>> {
        let mut data = self.data.write().await;
        let entries = data.taxonomy.entry(kind).or_default();

        if let Some(name) = &request.name {
            if entries.iter().any(|e| e.name == *name && e.id != id) {
                return Err(CatalogError::conflict(format!(
                    "{} '{}' already exists",
                    kind.label(),
                    name
                )));
            }
        }

        let Some(entry) = entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &request.name {
            entry.name = name.clone();
        }
        if let Some(parent_id) = request.parent_id {
            entry.parent_id = parent_id;
        }
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, kind: TaxonomyKind, id: Uuid) -> CatalogResult<bool> {
        let mut data = self.data.write().await;
        let entries = data.taxonomy.entry(kind).or_default();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }

        // Mirror the schema: required children cascade, optional links are cleared
        for child_kind in TaxonomyKind::ALL {
            if child_kind.parent_kind() != Some(kind) {
                continue;
            }
            let children = data.taxonomy.entry(child_kind).or_default();
            if child_kind.requires_parent() {
                children.retain(|e| e.parent_id != Some(id));
            } else {
                for child in children.iter_mut().filter(|e| e.parent_id == Some(id)) {
                    child.parent_id = None;
                }
            }
        }

        if kind == TaxonomyKind::Color {
            data.product_colors.retain(|(_, c)| *c != id);
        }

        let live: Vec<(TaxonomyKind, Uuid)> = TaxonomyKind::ALL
            .iter()
            .flat_map(|k| data.entries(*k).iter().map(move |e| (*k, e.id)))
            .collect();
        let exists = |kind: TaxonomyKind, id: Option<Uuid>| {
            id.filter(|id| live.contains(&(kind, *id)))
        };
        for product in data.products.iter_mut() {
            let refs = &mut product.references;
            refs.category_id = exists(TaxonomyKind::Category, refs.category_id);
            refs.subcategory_id = exists(TaxonomyKind::SubCategory, refs.subcategory_id);
            refs.quality_id = exists(TaxonomyKind::Quality, refs.quality_id);
            refs.size_id = exists(TaxonomyKind::Size, refs.size_id);
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NewProduct;

    fn aggregate(name: &str, price: f64, colors: &[&str]) -> NewProductAggregate {
        NewProductAggregate {
            product: NewProduct {
                name: name.to_string(),
                short_description: "short".to_string(),
                detailed_description: "detailed".to_string(),
                price,
                original_price: price,
                discount: 0.0,
                tax: 0.0,
                references: ProductReferences::default(),
                tag: None,
            },
            images: Vec::new(),
            video: None,
            colors: ColorName::parse_all(colors.iter().copied()).unwrap(),
        }
    }

    fn media(id: &str) -> StoredMedia {
        StoredMedia {
            media_id: id.to_string(),
            url: format!("memory://{}", id),
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let repo = InMemoryCatalogRepository::new();
        repo.create_aggregate(aggregate("Shirt", 10.0, &[])).await.unwrap();

        let err = repo
            .create_aggregate(aggregate("Shirt", 12.0, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_unknown_reference_leaves_no_rows() {
        let repo = InMemoryCatalogRepository::new();
        let mut request = aggregate("Shirt", 10.0, &["Red"]);
        request.product.references.category_id = Some(Uuid::new_v4());

        let err = repo.create_aggregate(request).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation { .. }));
        assert!(!repo.name_exists("Shirt").await.unwrap());
        assert!(repo.list(TaxonomyKind::Color).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_colors_are_reused_by_name() {
        let repo = InMemoryCatalogRepository::new();
        repo.create_aggregate(aggregate("A", 1.0, &["Red", "Blue"])).await.unwrap();
        repo.create_aggregate(aggregate("B", 1.0, &["Blue"])).await.unwrap();

        let colors = repo.list(TaxonomyKind::Color).await.unwrap();
        let names: Vec<&str> = colors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Blue", "Red"]);
    }

    #[tokio::test]
    async fn test_product_colors_are_ordered_by_name() {
        let repo = InMemoryCatalogRepository::new();
        let created = repo
            .create_aggregate(aggregate("Scarf", 5.0, &["Red", "Blue", "Amber"]))
            .await
            .unwrap();

        assert_eq!(created.color_names(), vec!["Amber", "Blue", "Red"]);
    }

    #[tokio::test]
    async fn test_update_reports_released_media() {
        let repo = InMemoryCatalogRepository::new();
        let mut request = aggregate("Shirt", 10.0, &[]);
        request.images = vec![media("a"), media("b")];
        request.video = Some(media("v"));
        let created = repo.create_aggregate(request).await.unwrap();

        let updated = repo
            .update_aggregate(
                created.product.id,
                ProductChanges {
                    images: Some(vec![media("c")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.released_media, vec!["a", "b"]);
        assert_eq!(updated.details.images.len(), 1);
        assert_eq!(updated.details.images[0].rank, 1);
        assert_eq!(updated.details.videos.len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_category_clears_product_reference() {
        let repo = InMemoryCatalogRepository::new();
        let category = TaxonomyRepository::create(&repo, TaxonomyKind::Category, "Women", None)
            .await
            .unwrap();
        let sub = TaxonomyRepository::create(&repo, TaxonomyKind::SubCategory, "Tops", Some(category.id))
            .await
            .unwrap();

        let mut request = aggregate("Shirt", 10.0, &[]);
        request.product.references.category_id = Some(category.id);
        let created = repo.create_aggregate(request).await.unwrap();

        assert!(TaxonomyRepository::delete(&repo, TaxonomyKind::Category, category.id)
            .await
            .unwrap());

        let product = ProductRepository::find_by_id(&repo, created.product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.product.references.category_id, None);
        assert!(TaxonomyRepository::find_by_id(&repo, TaxonomyKind::SubCategory, sub.id)
            .await
            .unwrap()
            .is_none());
    }
}
