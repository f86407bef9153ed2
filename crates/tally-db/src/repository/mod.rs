//! # Repository Module
//!
//! Database repositories for Tally.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tally-api command                                                     │
//! │       │                                                                 │
//! │       │  db.sales().get_by_id(&id)                                     │
//! │       ▼                                                                 │
//! │  SaleRepository                     SaleEventRepository                │
//! │  ├── get_by_id / get_all            ├── record / record_all            │
//! │  ├── create                         ├── list_for_sale                  │
//! │  ├── update                         └── count                          │
//! │  ├── update_with_line_items                                            │
//! │  └── delete                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sales, sale_items, sale_events                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories load and store whole [`Sale`](tally_core::Sale) aggregates.
//! Row structs never leave this module.

pub mod event;
pub mod sale;
