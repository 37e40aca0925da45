//! Postgres-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;
use uuid::Uuid;
use crate::config::DatabaseConfig;
use crate::domain::aggregates::{Artwork, Cart, CartItem, CommunityEvent, Order, OrderLine, Role, User, UserType};
use crate::domain::value_objects::Percent;
use crate::store::{ArtworkFilter, CartStore, CatalogStore, CommunityStore, OrderStore, Settled, UserStore, UserWrite};
use crate::{MarketError, Result};

#[derive(Clone)]
pub struct PgStore { pool: PgPool }

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self { Self { pool } }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| MarketError::StorageError(e.to_string()))
    }
}

#[derive(sqlx::FromRow)]
struct ArtworkRow {
    id: Uuid, title: String, category: String, description: String, artist: String,
    price: Decimal, stock: i32, rating: Decimal, image: String,
    dimensions: Option<String>, medium: Option<String>, year_created: Option<i32>,
    discount: Decimal, in_stock: bool, created_by: Uuid,
    created_at: DateTime<Utc>, updated_at: DateTime<Utc>,
}

impl TryFrom<ArtworkRow> for Artwork {
    type Error = MarketError;
    fn try_from(r: ArtworkRow) -> Result<Self> {
        Ok(Self {
            id: r.id, title: r.title, category: r.category, description: r.description, artist: r.artist,
            price: r.price,
            stock: u32::try_from(r.stock).map_err(|_| MarketError::StorageError(format!("negative stock on artwork {}", r.id)))?,
            rating: r.rating, image: r.image, dimensions: r.dimensions, medium: r.medium, year_created: r.year_created,
            discount: Percent::new(r.discount).map_err(|e| MarketError::StorageError(e.to_string()))?,
            in_stock: r.in_stock, created_by: r.created_by, created_at: r.created_at, updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartRow { id: Uuid, user_id: Uuid, items: Json<Vec<CartItem>>, created_at: DateTime<Utc>, updated_at: DateTime<Utc> }

#[derive(sqlx::FromRow)]
struct OrderRow { id: Uuid, user_id: Uuid, artworks: Json<Vec<OrderLine>>, total: Decimal, date: DateTime<Utc>, payment_reference: Option<String> }

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self { Order::restore(r.id, r.user_id, r.artworks.0, r.total, r.date, r.payment_reference) }
}

#[derive(sqlx::FromRow)]
struct UserRow { id: Uuid, username: String, email: String, password_hash: String, role: String, user_type: Option<String>, created_at: DateTime<Utc> }

impl TryFrom<UserRow> for User {
    type Error = MarketError;
    fn try_from(r: UserRow) -> Result<Self> {
        let role = Role::parse(&r.role).ok_or_else(|| MarketError::StorageError(format!("unknown role {}", r.role)))?;
        Ok(Self {
            id: r.id, username: r.username, email: r.email, password_hash: r.password_hash, role,
            user_type: r.user_type.as_deref().and_then(UserType::parse), created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommunityEventRow { id: Uuid, title: String, location: String, date: DateTime<Utc>, description: String, image: Option<String>, created_at: DateTime<Utc> }

impl From<CommunityEventRow> for CommunityEvent {
    fn from(r: CommunityEventRow) -> Self {
        Self { id: r.id, title: r.title, location: r.location, date: r.date, description: r.description, image: r.image, created_at: r.created_at }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

fn stock_column(stock: u32) -> Result<i32> {
    i32::try_from(stock).map_err(|_| MarketError::Validation(format!("stock {stock} is too large")))
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn artwork(&self, id: Uuid) -> Result<Option<Artwork>> {
        sqlx::query_as::<_, ArtworkRow>("SELECT * FROM artworks WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?
            .map(Artwork::try_from).transpose()
    }

    async fn artworks(&self, ids: &[Uuid]) -> Result<Vec<Artwork>> {
        if ids.is_empty() { return Ok(vec![]); }
        sqlx::query_as::<_, ArtworkRow>("SELECT * FROM artworks WHERE id = ANY($1)")
            .bind(ids).fetch_all(&self.pool).await?
            .into_iter().map(Artwork::try_from).collect()
    }

    async fn list_artworks(&self, filter: &ArtworkFilter) -> Result<Vec<Artwork>> {
        sqlx::query_as::<_, ArtworkRow>(
            "SELECT * FROM artworks \
             WHERE ($1::text IS NULL OR lower(category) = lower($1)) \
               AND ($2::text IS NULL OR lower(artist) = lower($2)) \
               AND ($3::bool IS NULL OR in_stock = $3) \
               AND ($4::uuid IS NULL OR created_by = $4) \
             ORDER BY created_at DESC")
            .bind(&filter.category).bind(&filter.artist).bind(filter.in_stock).bind(filter.created_by)
            .fetch_all(&self.pool).await?
            .into_iter().map(Artwork::try_from).collect()
    }

    async fn insert_artwork(&self, a: &Artwork) -> Result<()> {
        sqlx::query("INSERT INTO artworks (id, title, category, description, artist, price, stock, rating, image, dimensions, medium, year_created, discount, in_stock, created_by, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)")
            .bind(a.id).bind(&a.title).bind(&a.category).bind(&a.description).bind(&a.artist)
            .bind(a.price).bind(stock_column(a.stock)?).bind(a.rating).bind(&a.image)
            .bind(&a.dimensions).bind(&a.medium).bind(a.year_created).bind(a.discount.value())
            .bind(a.in_stock).bind(a.created_by).bind(a.created_at).bind(a.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn update_artwork(&self, a: &Artwork) -> Result<bool> {
        let done = sqlx::query("UPDATE artworks SET title = $2, category = $3, description = $4, artist = $5, price = $6, stock = $7, rating = $8, image = $9, dimensions = $10, medium = $11, year_created = $12, discount = $13, in_stock = $14, updated_at = $15 WHERE id = $1")
            .bind(a.id).bind(&a.title).bind(&a.category).bind(&a.description).bind(&a.artist)
            .bind(a.price).bind(stock_column(a.stock)?).bind(a.rating).bind(&a.image)
            .bind(&a.dimensions).bind(&a.medium).bind(a.year_created).bind(a.discount.value())
            .bind(a.in_stock).bind(a.updated_at)
            .execute(&self.pool).await?;
        Ok(done.rows_affected() == 1)
    }

    async fn delete_artwork(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM artworks WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() == 1)
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>("SELECT * FROM carts WHERE user_id = $1")
            .bind(user_id).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| Cart::restore(r.id, r.user_id, r.items.0, r.created_at, r.updated_at)))
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        sqlx::query("INSERT INTO carts (id, user_id, items, created_at, updated_at) VALUES ($1, $2, $3, $4, $5) ON CONFLICT (user_id) DO UPDATE SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at")
            .bind(cart.id()).bind(cart.user_id()).bind(Json(cart.items())).bind(cart.created_at()).bind(cart.updated_at())
            .execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE user_id = $1 ORDER BY date DESC")
            .bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn order_by_payment(&self, reference: &str) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE payment_reference = $1")
            .bind(reference).fetch_optional(&self.pool).await?;
        Ok(row.map(Order::from))
    }

    async fn insert_order(&self, o: &Order) -> Result<()> {
        sqlx::query("INSERT INTO orders (id, user_id, artworks, total, date, payment_reference) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(o.id()).bind(o.user_id()).bind(Json(o.artworks())).bind(o.total()).bind(o.date()).bind(o.payment_reference())
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn settle(&self, o: &Order, consumed: &[Uuid]) -> Result<Settled> {
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query("INSERT INTO orders (id, user_id, artworks, total, date, payment_reference) VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (payment_reference) DO NOTHING")
            .bind(o.id()).bind(o.user_id()).bind(Json(o.artworks())).bind(o.total()).bind(o.date()).bind(o.payment_reference())
            .execute(&mut *tx).await?;
        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            let reference = o.payment_reference().unwrap_or_default();
            return match self.order_by_payment(reference).await? {
                Some(existing) => Ok(Settled::Duplicate(existing)),
                None => Err(MarketError::StorageError(format!("order {} was not stored", o.id()))),
            };
        }

        let mut oversold = Vec::new();
        for line in o.artworks() {
            let stock: Option<i32> = sqlx::query_scalar("SELECT stock FROM artworks WHERE id = $1 FOR UPDATE")
                .bind(line.artwork_id).fetch_optional(&mut *tx).await?;
            let Some(stock) = stock else { continue };
            let sold = i32::try_from(line.quantity.value()).unwrap_or(i32::MAX);
            if sold > stock { oversold.push(line.artwork_id); }
            sqlx::query("UPDATE artworks SET stock = GREATEST(stock - $2, 0), in_stock = (stock - $2) > 0, updated_at = NOW() WHERE id = $1")
                .bind(line.artwork_id).bind(sold)
                .execute(&mut *tx).await?;
        }

        let cart = sqlx::query_as::<_, CartRow>("SELECT * FROM carts WHERE user_id = $1 FOR UPDATE")
            .bind(o.user_id()).fetch_optional(&mut *tx).await?;
        if let Some(r) = cart {
            let mut cart = Cart::restore(r.id, r.user_id, r.items.0, r.created_at, r.updated_at);
            cart.remove_settled(consumed);
            sqlx::query("UPDATE carts SET items = $2, updated_at = $3 WHERE user_id = $1")
                .bind(o.user_id()).bind(Json(cart.items())).bind(cart.updated_at())
                .execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(Settled::Placed { oversold })
    }

    async fn revenue(&self) -> Result<(Decimal, i64)> {
        let row: (Decimal, i64) = sqlx::query_as("SELECT COALESCE(SUM(total), 0), COUNT(*) FROM orders")
            .fetch_one(&self.pool).await?;
        Ok(row)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn user(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?
            .map(User::try_from).transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase()).fetch_optional(&self.pool).await?
            .map(User::try_from).transpose()
    }

    async fn insert_user(&self, u: &User) -> Result<bool> {
        let done = sqlx::query("INSERT INTO users (id, username, email, password_hash, role, user_type, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT DO NOTHING")
            .bind(u.id).bind(&u.username).bind(&u.email).bind(&u.password_hash)
            .bind(u.role.as_str()).bind(u.user_type.map(|t| t.as_str())).bind(u.created_at)
            .execute(&self.pool).await?;
        Ok(done.rows_affected() == 1)
    }

    async fn update_user(&self, u: &User) -> Result<UserWrite> {
        let done = sqlx::query("UPDATE users SET username = $2, email = $3, password_hash = $4 WHERE id = $1")
            .bind(u.id).bind(&u.username).bind(&u.email).bind(&u.password_hash)
            .execute(&self.pool).await;
        match done {
            Ok(done) if done.rows_affected() == 1 => Ok(UserWrite::Saved),
            Ok(_) => Ok(UserWrite::Missing),
            Err(e) if is_unique_violation(&e) => Ok(UserWrite::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() == 1)
    }

    async fn toggle_favorite(&self, user_id: Uuid, artwork_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND artwork_id = $2")
            .bind(user_id).bind(artwork_id).execute(&mut *tx).await?;
        if removed.rows_affected() == 0 {
            sqlx::query("INSERT INTO favorites (user_id, artwork_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(user_id).bind(artwork_id).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(removed.rows_affected() == 0)
    }

    async fn favorites(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT artwork_id FROM favorites WHERE user_id = $1 ORDER BY created_at")
            .bind(user_id).fetch_all(&self.pool).await?;
        Ok(ids)
    }
}

#[async_trait]
impl CommunityStore for PgStore {
    async fn community_events(&self) -> Result<Vec<CommunityEvent>> {
        let rows = sqlx::query_as::<_, CommunityEventRow>("SELECT * FROM community_events ORDER BY date ASC")
            .fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(CommunityEvent::from).collect())
    }

    async fn community_event(&self, id: Uuid) -> Result<Option<CommunityEvent>> {
        let row = sqlx::query_as::<_, CommunityEventRow>("SELECT * FROM community_events WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(CommunityEvent::from))
    }

    async fn insert_community_event(&self, e: &CommunityEvent) -> Result<()> {
        sqlx::query("INSERT INTO community_events (id, title, location, date, description, image, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(e.id).bind(&e.title).bind(&e.location).bind(e.date).bind(&e.description).bind(&e.image).bind(e.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn update_community_event(&self, e: &CommunityEvent) -> Result<bool> {
        let done = sqlx::query("UPDATE community_events SET title = $2, location = $3, date = $4, description = $5, image = $6 WHERE id = $1")
            .bind(e.id).bind(&e.title).bind(&e.location).bind(e.date).bind(&e.description).bind(&e.image)
            .execute(&self.pool).await?;
        Ok(done.rows_affected() == 1)
    }

    async fn delete_community_event(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM community_events WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() == 1)
    }
}
