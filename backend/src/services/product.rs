//! Product stock access for the order engine and the expiration sweep
//!
//! Product CRUD lives elsewhere; this service only covers the surface the
//! core consumes: lookups and atomic stock adjustment. Every mutation is a
//! single store-level increment/decrement so concurrent order verifications
//! and sweep runs cannot lose updates.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Product service for stock reads and atomic adjustments
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product row as the core sees it
#[derive(Debug, Clone, serde::Serialize, FromRow)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub current_stock: i32,
    pub min_qty: i32,
    pub recommended_qty: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    pub fn is_low_stock(&self) -> bool {
        self.current_stock < self.min_qty
    }
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a product by ID
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<ProductRecord> {
        let product = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, name, unit, current_stock, min_qty, recommended_qty,
                   image_url, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(product)
    }

    /// Adjust a product's stock by `delta`, clamped at zero.
    ///
    /// The adjustment is a single conditional update at the store level,
    /// never a read-modify-write in application code.
    pub async fn adjust_stock(&self, product_id: Uuid, delta: i32) -> AppResult<ProductRecord> {
        let product = sqlx::query_as::<_, ProductRecord>(
            r#"
            UPDATE products
            SET current_stock = GREATEST(current_stock + $2, 0), updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, unit, current_stock, min_qty, recommended_qty,
                      image_url, created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(product)
    }

    /// Products currently below their minimum stock threshold
    pub async fn list_low_stock(&self) -> AppResult<Vec<ProductRecord>> {
        let products = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, name, unit, current_stock, min_qty, recommended_qty,
                   image_url, created_at, updated_at
            FROM products
            WHERE current_stock < min_qty
            ORDER BY current_stock - min_qty ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }
}
