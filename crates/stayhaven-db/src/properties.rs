//! Property repository.
//!
//! Properties and their images live in separate tables; every read that
//! returns [`PropertyWithImages`] loads the images in a second query keyed by
//! property id, ordered by `sort_order`.

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::schema::{
    contains_pattern, ModerationPatch, NewImage, OwnerSummary, Property, PropertyImage, PropertyStatus,
    PropertyWithImages, PropertyWrite,
};

/// Sort order for public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl ListingSort {
    /// Unknown values fall back to newest first.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "price_asc" => ListingSort::PriceAsc,
            "price_desc" => ListingSort::PriceDesc,
            _ => ListingSort::Newest,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            ListingSort::Newest => " ORDER BY updated_at DESC",
            ListingSort::PriceAsc => " ORDER BY price ASC, updated_at DESC",
            ListingSort::PriceDesc => " ORDER BY price DESC, updated_at DESC",
        }
    }
}

/// Public listing search. Only active, published properties are ever returned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub rooms: Option<i32>,
    /// Matches properties having at least one of these.
    pub amenities: Vec<String>,
    /// Lower bound on the displayed guest rating.
    pub min_rating: Option<f64>,
    /// Rating shown for unrated properties; `min_rating` compares against it.
    pub default_rating: f64,
    pub sort: ListingSort,
    pub offset: i64,
    pub limit: i64,
}

/// Repository for property operations.
#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Property>> {
        let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(property)
    }

    pub async fn find_with_images(&self, id: Uuid) -> Result<Option<PropertyWithImages>> {
        match self.find(id).await? {
            Some(property) => Ok(self.attach_images(vec![property]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Published property by slug, or by id for properties without one.
    pub async fn find_published(&self, slug_or_id: &str) -> Result<Option<PropertyWithImages>> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            SELECT * FROM properties
            WHERE (slug = $1 OR id::text = $1)
              AND status = 'published'
            LIMIT 1
            "#,
        )
        .bind(slug_or_id)
        .fetch_optional(&self.pool)
        .await?;

        match property {
            Some(p) => Ok(self.attach_images(vec![p]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Every published property, most recently updated first.
    pub async fn list_published(&self) -> Result<Vec<PropertyWithImages>> {
        let rows = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE status = 'published' ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        self.attach_images(rows).await
    }

    pub async fn search(&self, query: &ListingQuery) -> Result<Vec<PropertyWithImages>> {
        let mut builder = listing_search_sql(query);
        let rows = builder
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;
        self.attach_images(rows).await
    }

    pub async fn featured(&self, limit: i64) -> Result<Vec<PropertyWithImages>> {
        let rows = sqlx::query_as::<_, Property>(
            r#"
            SELECT * FROM properties
            WHERE featured AND active AND status = 'published'
            ORDER BY updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        self.attach_images(rows).await
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PropertyWithImages>> {
        let rows = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE owner_id = $1 ORDER BY updated_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_images(rows).await
    }

    /// Moderation list: text search over title, city, country and description,
    /// optionally featured only, with owner summaries attached.
    pub async fn admin_search(&self, q: &str, featured_only: bool, limit: i64) -> Result<Vec<PropertyWithImages>> {
        let q = q.trim();
        let pattern = (!q.is_empty()).then(|| contains_pattern(q));
        let rows = sqlx::query_as::<_, Property>(
            r#"
            SELECT * FROM properties
            WHERE ($1::text IS NULL
                   OR title ILIKE $1
                   OR city ILIKE $1
                   OR country ILIKE $1
                   OR description ILIKE $1)
              AND (NOT $2 OR featured)
            ORDER BY updated_at DESC
            LIMIT $3
            "#,
        )
        .bind(pattern)
        .bind(featured_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let owner_ids: Vec<Uuid> = rows.iter().map(|p| p.owner_id).collect();
        let owners: HashMap<Uuid, OwnerSummary> = sqlx::query_as::<_, OwnerSummary>(
            "SELECT id, name, email FROM users WHERE id = ANY($1)",
        )
        .bind(&owner_ids)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|o| (o.id, o))
        .collect();

        let mut listed = self.attach_images(rows).await?;
        for item in &mut listed {
            item.owner = owners.get(&item.property.owner_id).cloned();
        }
        Ok(listed)
    }

    /// Insert a property and its images in one transaction.
    pub async fn create(&self, owner_id: Uuid, slug: &str, write: &PropertyWrite) -> Result<PropertyWithImages> {
        let mut tx = self.pool.begin().await?;

        let property = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties
                (owner_id, slug, title, description, address, city, country, price, rooms,
                 bathrooms, property_type, status, latitude, longitude, amenities, facilities)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(slug)
        .bind(&write.title)
        .bind(&write.description)
        .bind(&write.address)
        .bind(&write.city)
        .bind(&write.country)
        .bind(write.price)
        .bind(write.rooms)
        .bind(write.bathrooms)
        .bind(&write.property_type)
        .bind(write.status.as_str())
        .bind(write.latitude)
        .bind(write.longitude)
        .bind(&write.amenities)
        .bind(&write.facilities)
        .fetch_one(&mut *tx)
        .await?;

        let images = insert_images(&mut tx, property.id, &write.images).await?;
        tx.commit().await?;

        tracing::info!(property_id = %property.id, %owner_id, "property created");
        Ok(PropertyWithImages { property, images, owner: None })
    }

    /// Overwrite every editable column and replace the image set.
    pub async fn update(&self, id: Uuid, write: &PropertyWrite) -> Result<Option<PropertyWithImages>> {
        let mut tx = self.pool.begin().await?;

        let property = sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties SET
                title         = $2,
                description   = $3,
                address       = $4,
                city          = $5,
                country       = $6,
                price         = $7,
                rooms         = $8,
                bathrooms     = $9,
                property_type = $10,
                status        = $11,
                latitude      = $12,
                longitude     = $13,
                amenities     = $14,
                facilities    = $15,
                updated_at    = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&write.title)
        .bind(&write.description)
        .bind(&write.address)
        .bind(&write.city)
        .bind(&write.country)
        .bind(write.price)
        .bind(write.rooms)
        .bind(write.bathrooms)
        .bind(&write.property_type)
        .bind(write.status.as_str())
        .bind(write.latitude)
        .bind(write.longitude)
        .bind(&write.amenities)
        .bind(&write.facilities)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(property) = property else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM property_images WHERE property_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let images = insert_images(&mut tx, id, &write.images).await?;
        tx.commit().await?;

        Ok(Some(PropertyWithImages { property, images, owner: None }))
    }

    pub async fn moderate(&self, id: Uuid, patch: &ModerationPatch) -> Result<Option<Property>> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties SET
                featured   = COALESCE($2, featured),
                active     = COALESCE($3, active),
                status     = COALESCE($4, status),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.featured)
        .bind(patch.active)
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(property)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM properties WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Load images for `rows` and pair them up, preserving row order.
    async fn attach_images(&self, rows: Vec<Property>) -> Result<Vec<PropertyWithImages>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();
        let images = sqlx::query_as::<_, PropertyImage>(
            r#"
            SELECT * FROM property_images
            WHERE property_id = ANY($1)
            ORDER BY property_id, sort_order, id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_property: HashMap<Uuid, Vec<PropertyImage>> = HashMap::new();
        for image in images {
            by_property.entry(image.property_id).or_default().push(image);
        }

        Ok(rows
            .into_iter()
            .map(|property| {
                let images = by_property.remove(&property.id).unwrap_or_default();
                PropertyWithImages { property, images, owner: None }
            })
            .collect())
    }
}

async fn insert_images(
    tx: &mut Transaction<'_, Postgres>,
    property_id: Uuid,
    images: &[NewImage],
) -> Result<Vec<PropertyImage>> {
    if images.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO property_images (property_id, url, alt, sort_order, is_thumb) ");
    builder.push_values(images, |mut row, image| {
        row.push_bind(property_id)
            .push_bind(image.url.clone())
            .push_bind(image.alt.clone())
            .push_bind(image.sort_order)
            .push_bind(image.is_thumb);
    });
    builder.push(" RETURNING *");

    let mut inserted = builder
        .build_query_as::<PropertyImage>()
        .fetch_all(&mut **tx)
        .await?;
    inserted.sort_by_key(|img| img.sort_order);
    Ok(inserted)
}

/// Build the public search statement. Kept separate so the generated SQL can be inspected.
pub fn listing_search_sql(query: &ListingQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT * FROM properties WHERE active AND status = ",
    );
    builder.push_bind(PropertyStatus::Published.as_str());

    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = contains_pattern(q);
        builder.push(" AND (");
        let mut first = true;
        for column in ["title", "city", "country", "address", "description"] {
            if !first {
                builder.push(" OR ");
            }
            first = false;
            builder.push(column).push(" ILIKE ").push_bind(pattern.clone());
        }
        builder.push(")");
    }
    if let Some(city) = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        builder.push(" AND city ILIKE ").push_bind(contains_pattern(city));
    }
    if let Some(country) = query.country.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        builder.push(" AND country ILIKE ").push_bind(contains_pattern(country));
    }
    if let Some(min) = query.min_price {
        builder.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = query.max_price {
        builder.push(" AND price <= ").push_bind(max);
    }
    if let Some(rooms) = query.rooms {
        builder.push(" AND rooms = ").push_bind(rooms);
    }
    if !query.amenities.is_empty() {
        builder.push(" AND amenities && ").push_bind(query.amenities.clone());
    }
    if let Some(min_rating) = query.min_rating {
        builder
            .push(" AND COALESCE(rating, ")
            .push_bind(query.default_rating)
            .push(") >= ")
            .push_bind(min_rating);
    }

    builder.push(query.sort.order_by());
    builder.push(" LIMIT ").push_bind(query.limit);
    builder.push(" OFFSET ").push_bind(query.offset);
    builder
}
