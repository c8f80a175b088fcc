use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgConnection, PgPool, Postgres, QueryBuilder, Row};
use std::collections::HashMap;
use uuid::Uuid;

use super::db_error::map_db_error;
use crate::{
    domain::{
        errors::{CatalogError, CatalogResult},
        models::{
            Color, NewProductAggregate, Page, Pagination, Product, ProductChanges,
            ProductDetails, ProductFilter, ProductImage, ProductReferences, ProductVideo,
            StoredMedia, UpdatedProduct,
        },
        value_objects::ColorName,
    },
    ports::repositories::ProductRepository,
};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.short_description, p.detailed_description, \
    p.price, p.original_price, p.discount, p.tax, p.category_id, p.subcategory_id, \
    p.quality_id, p.size_id, p.tag, p.created_at, p.updated_at";

const ENTITY: &str = "Product";

/// PostgreSQL implementation of ProductRepository.
///
/// Aggregate writes run in a single transaction. Uniqueness of product and
/// color names and every reference are enforced by the schema.
#[derive(Clone)]
pub struct SqlProductRepository {
    pool: PgPool,
}

impl SqlProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the product tables. The taxonomy tables must exist first.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                short_description TEXT NOT NULL,
                detailed_description TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                original_price DOUBLE PRECISION NOT NULL,
                discount DOUBLE PRECISION NOT NULL DEFAULT 0,
                tax DOUBLE PRECISION NOT NULL DEFAULT 0,
                category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
                subcategory_id UUID REFERENCES sub_categories(id) ON DELETE SET NULL,
                quality_id UUID REFERENCES qualities(id) ON DELETE SET NULL,
                size_id UUID REFERENCES sizes(id) ON DELETE SET NULL,
                tag TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS product_images (
                id UUID PRIMARY KEY,
                product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                media_id TEXT NOT NULL,
                url TEXT NOT NULL,
                rank INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS product_videos (
                id UUID PRIMARY KEY,
                product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                media_id TEXT NOT NULL,
                url TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS product_colors (
                product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                color_id UUID NOT NULL REFERENCES colors(id) ON DELETE CASCADE,
                PRIMARY KEY (product_id, color_id)
            );

            CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_products_tag ON products(tag);
            CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
            CREATE INDEX IF NOT EXISTS idx_product_images_product ON product_images(product_id);
            CREATE INDEX IF NOT EXISTS idx_product_videos_product ON product_videos(product_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
        Ok(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            short_description: row.try_get("short_description")?,
            detailed_description: row.try_get("detailed_description")?,
            price: row.try_get("price")?,
            original_price: row.try_get("original_price")?,
            discount: row.try_get("discount")?,
            tax: row.try_get("tax")?,
            references: ProductReferences {
                category_id: row.try_get("category_id")?,
                subcategory_id: row.try_get("subcategory_id")?,
                quality_id: row.try_get("quality_id")?,
                size_id: row.try_get("size_id")?,
            },
            tag: row.try_get("tag")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Attach images, videos and colors to product rows, keeping their order
    async fn load_details(
        conn: &mut PgConnection,
        products: Vec<Product>,
    ) -> Result<Vec<ProductDetails>, sqlx::Error> {
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let mut images: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
        let rows = sqlx::query(
            "SELECT id, product_id, media_id, url, rank FROM product_images \
             WHERE product_id = ANY($1) ORDER BY rank ASC",
        )
        .bind(&ids[..])
        .fetch_all(&mut *conn)
        .await?;
        for row in rows {
            let image = ProductImage {
                id: row.try_get("id")?,
                product_id: row.try_get("product_id")?,
                media_id: row.try_get("media_id")?,
                url: row.try_get("url")?,
                rank: row.try_get("rank")?,
            };
            images.entry(image.product_id).or_default().push(image);
        }

        let mut videos: HashMap<Uuid, Vec<ProductVideo>> = HashMap::new();
        let rows = sqlx::query(
            "SELECT id, product_id, media_id, url FROM product_videos WHERE product_id = ANY($1)",
        )
        .bind(&ids[..])
        .fetch_all(&mut *conn)
        .await?;
        for row in rows {
            let video = ProductVideo {
                id: row.try_get("id")?,
                product_id: row.try_get("product_id")?,
                media_id: row.try_get("media_id")?,
                url: row.try_get("url")?,
            };
            videos.entry(video.product_id).or_default().push(video);
        }

        let mut colors: HashMap<Uuid, Vec<Color>> = HashMap::new();
        let rows = sqlx::query(
            "SELECT pc.product_id, c.id, c.name FROM product_colors pc \
             JOIN colors c ON c.id = pc.color_id \
             WHERE pc.product_id = ANY($1) ORDER BY c.name",
        )
        .bind(&ids[..])
        .fetch_all(&mut *conn)
        .await?;
        for row in rows {
            let product_id: Uuid = row.try_get("product_id")?;
            colors.entry(product_id).or_default().push(Color {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            });
        }

        Ok(products
            .into_iter()
            .map(|product| ProductDetails {
                images: images.remove(&product.id).unwrap_or_default(),
                videos: videos.remove(&product.id).unwrap_or_default(),
                colors: colors.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }

    async fn fetch_details(conn: &mut PgConnection, id: Uuid) -> Result<Option<ProductDetails>, sqlx::Error> {
        let row = sqlx::query(&format!("SELECT {} FROM products p WHERE p.id = $1", PRODUCT_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let product = Self::product_from_row(&row)?;
        Ok(Self::load_details(conn, vec![product]).await?.pop())
    }

    async fn insert_images(
        conn: &mut PgConnection,
        product_id: Uuid,
        images: &[StoredMedia],
    ) -> Result<(), sqlx::Error> {
        for (idx, media) in images.iter().enumerate() {
            sqlx::query(
                "INSERT INTO product_images (id, product_id, media_id, url, rank) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(&media.media_id)
            .bind(&media.url)
            .bind(idx as i32 + 1)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    async fn insert_video(
        conn: &mut PgConnection,
        product_id: Uuid,
        media: &StoredMedia,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO product_videos (id, product_id, media_id, url) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(&media.media_id)
        .bind(&media.url)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Replace a product's color links, creating unknown colors.
    ///
    /// `ON CONFLICT DO NOTHING` keeps concurrent creators of the same color
    /// from failing each other.
    async fn link_colors(
        conn: &mut PgConnection,
        product_id: Uuid,
        colors: &[ColorName],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM product_colors WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *conn)
            .await?;

        for color in colors {
            sqlx::query("INSERT INTO colors (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
                .bind(Uuid::new_v4())
                .bind(color.as_str())
                .execute(&mut *conn)
                .await?;

            sqlx::query(
                "INSERT INTO product_colors (product_id, color_id) \
                 SELECT $1, id FROM colors WHERE name = $2 \
                 ON CONFLICT DO NOTHING",
            )
            .bind(product_id)
            .bind(color.as_str())
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
        builder.push(
            " FROM products p \
              LEFT JOIN categories cat ON cat.id = p.category_id \
              LEFT JOIN sizes sz ON sz.id = p.size_id \
              WHERE TRUE",
        );

        if let Some(category) = &filter.category {
            builder.push(" AND LOWER(cat.name) = LOWER(");
            builder.push_bind(category.clone());
            builder.push(")");
        }
        if let Some(tag) = &filter.tag {
            builder.push(" AND p.tag = LOWER(");
            builder.push_bind(tag.clone());
            builder.push(")");
        }
        if let Some(search) = &filter.search {
            builder.push(" AND p.name ILIKE ");
            builder.push_bind(format!("%{}%", escape_like(search)));
        }
        if let Some(size) = &filter.size {
            builder.push(" AND LOWER(sz.name) = LOWER(");
            builder.push_bind(size.clone());
            builder.push(")");
        }
        if let Some(color) = &filter.color {
            builder.push(
                " AND EXISTS (SELECT 1 FROM product_colors pc \
                  JOIN colors co ON co.id = pc.color_id \
                  WHERE pc.product_id = p.id AND LOWER(co.name) = LOWER(",
            );
            builder.push_bind(color.clone());
            builder.push("))");
        }
        if let Some(min_price) = filter.min_price {
            builder.push(" AND p.price >= ");
            builder.push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            builder.push(" AND p.price <= ");
            builder.push_bind(max_price);
        }
    }
}

/// Escape LIKE wildcards so a search matches literally
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl ProductRepository for SqlProductRepository {
    async fn create_aggregate(&self, aggregate: NewProductAggregate) -> CatalogResult<ProductDetails> {
        let db = |e: sqlx::Error| map_db_error(e, ENTITY);
        let mut tx = self.pool.begin().await.map_err(db)?;
        let product = &aggregate.product;
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, short_description, detailed_description,
                price, original_price, discount, tax,
                category_id, subcategory_id, quality_id, size_id, tag
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.short_description)
        .bind(&product.detailed_description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.discount)
        .bind(product.tax)
        .bind(product.references.category_id)
        .bind(product.references.subcategory_id)
        .bind(product.references.quality_id)
        .bind(product.references.size_id)
        .bind(&product.tag)
        .execute(&mut *tx)
        .await
        .map_err(db)?;

        Self::insert_images(&mut tx, id, &aggregate.images)
            .await
            .map_err(db)?;
        if let Some(video) = &aggregate.video {
            Self::insert_video(&mut tx, id, video).await.map_err(db)?;
        }
        Self::link_colors(&mut tx, id, &aggregate.colors)
            .await
            .map_err(db)?;

        let details = Self::fetch_details(&mut tx, id)
            .await
            .map_err(db)?
            .ok_or_else(|| CatalogError::internal("Inserted product missing"))?;

        tx.commit().await.map_err(db)?;
        Ok(details)
    }

    async fn update_aggregate(&self, id: Uuid, changes: ProductChanges) -> CatalogResult<UpdatedProduct> {
        let db = |e: sqlx::Error| map_db_error(e, ENTITY);
        let mut tx = self.pool.begin().await.map_err(db)?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM products p WHERE p.id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db)?
        .ok_or_else(|| CatalogError::not_found("Product not found"))?;

        let mut product = Self::product_from_row(&row).map_err(db)?;
        changes.patch.apply(&mut product);

        sqlx::query(
            r#"
            UPDATE products SET
                name = $2, short_description = $3, detailed_description = $4,
                price = $5, original_price = $6, discount = $7, tax = $8,
                category_id = $9, subcategory_id = $10, quality_id = $11, size_id = $12,
                tag = $13, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.short_description)
        .bind(&product.detailed_description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.discount)
        .bind(product.tax)
        .bind(product.references.category_id)
        .bind(product.references.subcategory_id)
        .bind(product.references.quality_id)
        .bind(product.references.size_id)
        .bind(&product.tag)
        .execute(&mut *tx)
        .await
        .map_err(db)?;

        let mut released_media: Vec<String> = Vec::new();

        if let Some(images) = &changes.images {
            let removed: Vec<String> =
                sqlx::query_scalar("DELETE FROM product_images WHERE product_id = $1 RETURNING media_id")
                    .bind(id)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(db)?;
            released_media.extend(removed);
            Self::insert_images(&mut tx, id, images).await.map_err(db)?;
        }

        if let Some(video) = &changes.video {
            let removed: Vec<String> =
                sqlx::query_scalar("DELETE FROM product_videos WHERE product_id = $1 RETURNING media_id")
                    .bind(id)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(db)?;
            released_media.extend(removed);
            Self::insert_video(&mut tx, id, video).await.map_err(db)?;
        }

        if let Some(colors) = &changes.colors {
            Self::link_colors(&mut tx, id, colors).await.map_err(db)?;
        }

        let details = Self::fetch_details(&mut tx, id)
            .await
            .map_err(db)?
            .ok_or_else(|| CatalogError::not_found("Product not found"))?;

        tx.commit().await.map_err(db)?;

        released_media.sort();
        released_media.dedup();
        Ok(UpdatedProduct {
            details,
            released_media,
        })
    }

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<ProductDetails>> {
        let mut conn = self.pool.acquire().await.map_err(|e| map_db_error(e, ENTITY))?;
        Self::fetch_details(&mut conn, id)
            .await
            .map_err(|e| map_db_error(e, ENTITY))
    }

    async fn name_exists(&self, name: &str) -> CatalogResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))
    }

    async fn find_page(
        &self,
        filter: &ProductFilter,
        pagination: Pagination,
    ) -> CatalogResult<Page<ProductDetails>> {
        let db = |e: sqlx::Error| map_db_error(e, ENTITY);
        let mut conn = self.pool.acquire().await.map_err(db)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        Self::push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&mut *conn)
            .await
            .map_err(db)?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {}", PRODUCT_COLUMNS));
        Self::push_filters(&mut select, filter);
        select.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        select.push_bind(pagination.limit as i64);
        select.push(" OFFSET ");
        select.push_bind(pagination.offset() as i64);

        let rows = select.build().fetch_all(&mut *conn).await.map_err(db)?;
        let products = rows
            .iter()
            .map(Self::product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db)?;

        let items = Self::load_details(&mut conn, products).await.map_err(db)?;
        Ok(Page::new(items, total.max(0) as u64, pagination))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> CatalogResult<Vec<ProductDetails>> {
        let db = |e: sqlx::Error| map_db_error(e, ENTITY);
        let mut conn = self.pool.acquire().await.map_err(db)?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM products p WHERE p.id = ANY($1) ORDER BY p.created_at DESC",
            PRODUCT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(db)?;

        let products = rows
            .iter()
            .map(Self::product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db)?;

        Self::load_details(&mut conn, products).await.map_err(db)
    }
}
