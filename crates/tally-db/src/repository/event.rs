//! # Sale Event Repository
//!
//! Durable log of the domain events a sale buffered.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command handler                                                       │
//! │       │                                                                 │
//! │       │ 1. sales().create / update ...           (commit)              │
//! │       │ 2. sale.drain_events()                                         │
//! │       │ 3. sale_events().record_all(&events)                           │
//! │       ▼                                                                 │
//! │  sale_events: id | sale_id | event_type | message | created_at         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recording happens after the sale is committed, so a crash between the
//! two steps loses the log entry but never the sale. Nothing reads this
//! table to drive behaviour; it is an audit trail for clients.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::DbResult;
use tally_core::{SaleEvent, SaleEventKind};

/// One stored event log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, TS)]
#[ts(export)]
pub struct SaleEventRecord {
    pub id: String,
    pub sale_id: String,
    pub event_type: SaleEventKind,
    pub message: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Repository for the sale event log.
#[derive(Debug, Clone)]
pub struct SaleEventRepository {
    pool: SqlitePool,
}

impl SaleEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleEventRepository { pool }
    }

    /// Appends one entry and returns its id.
    pub async fn record(
        &self,
        sale_id: &str,
        kind: SaleEventKind,
        message: &str,
    ) -> DbResult<String> {
        self.insert(sale_id, kind, message, Utc::now()).await
    }

    /// Appends one entry per event, keeping each event's own timestamp.
    /// Returns how many were written.
    pub async fn record_all(&self, events: &[SaleEvent]) -> DbResult<usize> {
        for event in events {
            self.insert(event.sale_id(), event.kind(), event.message(), event.occurred_at())
                .await?;
        }
        Ok(events.len())
    }

    /// Entries for one sale, oldest first.
    pub async fn list_for_sale(&self, sale_id: &str) -> DbResult<Vec<SaleEventRecord>> {
        let records = sqlx::query_as(
            r#"
            SELECT id, sale_id, event_type, message, created_at
            FROM sale_events
            WHERE sale_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Total number of entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(
        &self,
        sale_id: &str,
        kind: SaleEventKind,
        message: &str,
        created_at: DateTime<Utc>,
    ) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();

        debug!(sale_id = %sale_id, event_type = %kind, "Recording sale event");

        sqlx::query(
            r#"
            INSERT INTO sale_events (id, sale_id, event_type, message, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(sale_id)
        .bind(kind)
        .bind(message)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tally_core::{LineItem, Money, Sale};

    #[tokio::test]
    async fn test_record_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let events = db.sale_events();

        events
            .record("sale-1", SaleEventKind::Created, "Sale created successfully!")
            .await
            .unwrap();
        events
            .record("sale-2", SaleEventKind::Created, "Sale created successfully!")
            .await
            .unwrap();

        let listed = events.list_for_sale("sale-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].event_type, SaleEventKind::Created);
        assert_eq!(listed[0].message, "Sale created successfully!");
        assert_eq!(events.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_record_all_drained_events() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = LineItem::create("prod-1", "", 1, Money::from_cents(100)).unwrap();
        let mut sale = Sale::create("S-1", Utc::now(), "c", "b", vec![item]).unwrap();
        sale.cancel();

        let written = db.sale_events().record_all(&sale.drain_events()).await.unwrap();
        assert_eq!(written, 2);

        let kinds: Vec<SaleEventKind> = db
            .sale_events()
            .list_for_sale(sale.id())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.event_type)
            .collect();
        assert_eq!(kinds, vec![SaleEventKind::Created, SaleEventKind::Cancelled]);
    }
}
