//! # tally-core: Sale Aggregate for Tally
//!
//! Everything Tally knows about a sale lives here: the header, its line
//! items, the quantity discount tiers and the lifecycle rules. There is no
//! I/O in this crate; persistence and transport are layered on top.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tally-api (axum)                             │   │
//! │  │    routes ──► commands (create, update, checkout, cancel)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   sale    │  │ line_item │  │ discount  │  │ validation│  │   │
//! │  │   │ lifecycle │  │  totals   │  │   tiers   │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (SQLite)                            │   │
//! │  │          sales, sale_items, sale_events repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent money and the discount rate type
//! - [`line_item`] - A product line owned by a sale
//! - [`discount`] - Quantity discount tiers
//! - [`sale`] - The sale aggregate and its lifecycle
//! - [`reconcile`] - Merging an incoming item list into an existing sale
//! - [`events`] - Domain events buffered by the aggregate
//! - [`views`] - Serializable read models
//! - [`validation`] - Field-level checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use tally_core::{LineItem, Money, Sale};
//!
//! let item = LineItem::create("prod-1", "", 5, Money::from_cents(10_000)).unwrap();
//! let mut sale = Sale::create("S-0001", Utc::now(), "cust-1", "branch-1", vec![item]).unwrap();
//!
//! sale.apply_discount_rules().unwrap();
//!
//! // 5 × $100.00 at 10% off
//! assert_eq!(sale.total().cents(), 45_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod error;
pub mod events;
pub mod line_item;
pub mod money;
pub mod reconcile;
pub mod sale;
pub mod validation;
pub mod views;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use discount::{discount_for_quantity, DiscountFailure};
pub use error::{CoreError, CoreResult, SaleStateError, ValidationError};
pub use events::{SaleEvent, SaleEventKind};
pub use line_item::LineItem;
pub use money::{DiscountRate, Money};
pub use reconcile::{reconcile_line_items, IncomingLineItem};
pub use sale::Sale;
pub use views::{LineItemView, SaleView};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest quantity of a single product a sale line may carry.
///
/// Anything above this is rejected by the discount policy rather than by
/// input validation, so the sale can still be built and reported on.
pub const MAX_ITEM_QUANTITY: i64 = 20;
