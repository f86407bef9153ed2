//! # Sale Repository
//!
//! Loads and stores whole sale aggregates: the `sales` header row plus its
//! ordered `sale_items`.
//!
//! ## Optimistic Concurrency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller A: get_by_id ──► version 3 ──► mutate ──► update ──► version 4  │
//! │  caller B: get_by_id ──► version 3 ──► mutate ─────────────► update     │
//! │                                                                 │       │
//! │        UPDATE sales ... WHERE id = ? AND version = 3  ◄──────────┘       │
//! │        0 rows affected ──► DbError::ConcurrencyConflict                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A zero-row update is never reported as success.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use tally_core::{DiscountRate, LineItem, Money, Sale};

const ENTITY: &str = "Sale";

const SELECT_SALE: &str = r#"
    SELECT id, sale_number, sale_date, customer_id, branch_id,
           is_cancelled, is_checkout_completed, version
    FROM sales
"#;

const SELECT_ITEM: &str = r#"
    SELECT id, sale_id, product_id, quantity, unit_price_cents, discount_bps
    FROM sale_items
"#;

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    sale_number: String,
    sale_date: DateTime<Utc>,
    customer_id: String,
    branch_id: String,
    is_cancelled: bool,
    is_checkout_completed: bool,
    version: i64,
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    id: String,
    sale_id: String,
    product_id: String,
    quantity: i64,
    unit_price_cents: i64,
    discount_bps: i64,
}

impl SaleItemRow {
    fn into_line_item(self) -> DbResult<LineItem> {
        let bps = u32::try_from(self.discount_bps)
            .map_err(|e| DbError::corrupt("sale_items.discount_bps", e))?;
        Ok(LineItem::restore(
            self.id,
            self.product_id,
            self.sale_id,
            self.quantity,
            Money::from_cents(self.unit_price_cents),
            DiscountRate::from_bps(bps),
        ))
    }
}

impl SaleRow {
    fn into_sale(self, line_items: Vec<LineItem>) -> Sale {
        Sale::restore(
            self.id,
            self.sale_number,
            self.sale_date,
            self.customer_id,
            self.branch_id,
            self.is_cancelled,
            self.is_checkout_completed,
            line_items,
            self.version,
        )
    }
}

/// Repository for sale aggregates.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a sale with its line items in their stored order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row: Option<SaleRow> = sqlx::query_as(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<SaleItemRow> =
            sqlx::query_as(&format!("{SELECT_ITEM} WHERE sale_id = ?1 ORDER BY position"))
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        let line_items = items
            .into_iter()
            .map(SaleItemRow::into_line_item)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Some(row.into_sale(line_items)))
    }

    /// Gets every sale, most recent `sale_date` first.
    pub async fn get_all(&self) -> DbResult<Vec<Sale>> {
        let rows: Vec<SaleRow> =
            sqlx::query_as(&format!("{SELECT_SALE} ORDER BY sale_date DESC, sale_number"))
                .fetch_all(&self.pool)
                .await?;

        let items: Vec<SaleItemRow> =
            sqlx::query_as(&format!("{SELECT_ITEM} ORDER BY sale_id, position"))
                .fetch_all(&self.pool)
                .await?;

        let mut by_sale: HashMap<String, Vec<LineItem>> = HashMap::new();
        for item in items {
            let sale_id = item.sale_id.clone();
            by_sale.entry(sale_id).or_default().push(item.into_line_item()?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let line_items = by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(line_items)
            })
            .collect())
    }

    /// Number of stored sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a new sale and its items in one transaction. Returns the
    /// stored sale (version 1, empty event buffer).
    pub async fn create(&self, sale: &Sale) -> DbResult<Sale> {
        debug!(id = %sale.id(), sale_number = %sale.sale_number(), items = sale.line_items().len(), "Inserting sale");

        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, sale_date, customer_id, branch_id,
                is_cancelled, is_checkout_completed, version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)
            "#,
        )
        .bind(sale.id())
        .bind(sale.sale_number())
        .bind(sale.sale_date())
        .bind(sale.customer_id())
        .bind(sale.branch_id())
        .bind(sale.is_cancelled())
        .bind(sale.is_checkout_completed())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, sale).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.reload(sale.id()).await
    }

    /// Saves header fields and lifecycle flags. Line items are not touched.
    ///
    /// ## Errors
    /// - `NotFound` when no sale has this id
    /// - `ConcurrencyConflict` when the stored version moved on
    pub async fn update(&self, sale: &Sale) -> DbResult<Sale> {
        debug!(id = %sale.id(), version = sale.version(), "Updating sale");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        ensure_exists(&mut tx, sale.id()).await?;
        update_header(&mut tx, sale).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.reload(sale.id()).await
    }

    /// Saves the header and replaces every stored line item with the sale's
    /// current ones, atomically.
    ///
    /// ## Errors
    /// - `NotFound` when no sale has this id
    /// - `ConcurrencyConflict` when the versioned update affects no row
    pub async fn update_with_line_items(&self, sale: &Sale) -> DbResult<Sale> {
        debug!(
            id = %sale.id(),
            version = sale.version(),
            items = sale.line_items().len(),
            "Updating sale with line items"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        ensure_exists(&mut tx, sale.id()).await?;
        update_header(&mut tx, sale).await?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(sale.id())
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, sale).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.reload(sale.id()).await
    }

    /// Physically deletes a sale; its items go with it. Returns `false` when
    /// there was nothing to delete.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reload(&self, id: &str) -> DbResult<Sale> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }
}

// =============================================================================
// Statement Helpers
// =============================================================================

async fn ensure_exists(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT version FROM sales WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(DbError::not_found(ENTITY, id)),
    }
}

async fn update_header(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE sales SET
            sale_number = ?1,
            sale_date = ?2,
            customer_id = ?3,
            branch_id = ?4,
            is_cancelled = ?5,
            is_checkout_completed = ?6,
            version = version + 1,
            updated_at = ?7
        WHERE id = ?8 AND version = ?9
        "#,
    )
    .bind(sale.sale_number())
    .bind(sale.sale_date())
    .bind(sale.customer_id())
    .bind(sale.branch_id())
    .bind(sale.is_cancelled())
    .bind(sale.is_checkout_completed())
    .bind(Utc::now())
    .bind(sale.id())
    .bind(sale.version())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        warn!(id = %sale.id(), expected_version = sale.version(), "Stale sale update rejected");
        return Err(DbError::conflict(ENTITY, sale.id(), sale.version()));
    }
    Ok(())
}

async fn insert_items(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    for (position, item) in sale.line_items().iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, quantity, unit_price_cents,
                discount_bps, total_cents, position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(item.id())
        .bind(sale.id())
        .bind(item.product_id())
        .bind(item.quantity())
        .bind(item.unit_price().cents())
        .bind(item.discount().bps() as i64)
        .bind(item.total().cents())
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
