//! # Domain Events
//!
//! Records the sale aggregate buffers as it changes. The aggregate never
//! publishes them; a caller drains the buffer after persisting and hands the
//! events to the event log.
//!
//! ```text
//! Sale::create ──► Created ─┐
//! Sale::update ──► Modified ├──► Sale.events (buffer) ──drain──► sale_events table
//! Sale::cancel ──► Cancelled┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Event Kind
// =============================================================================

/// Discriminant stored alongside each event log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SaleEventKind {
    Created,
    Modified,
    Cancelled,
}

impl SaleEventKind {
    /// Customer-facing message written to the event log.
    pub fn message(&self) -> &'static str {
        match self {
            SaleEventKind::Created => "Sale created successfully!",
            SaleEventKind::Modified => "Sale updated successfully!",
            SaleEventKind::Cancelled => "Sale cancelled successfully!",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleEventKind::Created => "created",
            SaleEventKind::Modified => "modified",
            SaleEventKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SaleEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Event
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export)]
pub enum SaleEvent {
    Created {
        sale_id: String,
        sale_number: String,
        #[ts(as = "String")]
        occurred_at: DateTime<Utc>,
    },
    Modified {
        sale_id: String,
        #[ts(as = "String")]
        occurred_at: DateTime<Utc>,
    },
    Cancelled {
        sale_id: String,
        #[ts(as = "String")]
        occurred_at: DateTime<Utc>,
    },
}

impl SaleEvent {
    pub fn kind(&self) -> SaleEventKind {
        match self {
            SaleEvent::Created { .. } => SaleEventKind::Created,
            SaleEvent::Modified { .. } => SaleEventKind::Modified,
            SaleEvent::Cancelled { .. } => SaleEventKind::Cancelled,
        }
    }

    pub fn sale_id(&self) -> &str {
        match self {
            SaleEvent::Created { sale_id, .. }
            | SaleEvent::Modified { sale_id, .. }
            | SaleEvent::Cancelled { sale_id, .. } => sale_id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SaleEvent::Created { occurred_at, .. }
            | SaleEvent::Modified { occurred_at, .. }
            | SaleEvent::Cancelled { occurred_at, .. } => *occurred_at,
        }
    }

    pub fn message(&self) -> &'static str {
        self.kind().message()
    }
}
