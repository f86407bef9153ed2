//! # Commands Module
//!
//! Use cases the HTTP routes call into. Each command loads what it needs
//! through `tally-db`, runs the aggregate, persists, then logs the events
//! the aggregate buffered.
//!
//! ```text
//! route handler ──► command ──► Sale (tally-core)
//!                      │
//!                      ├──► db.sales()        write, commit
//!                      └──► db.sale_events()  record drained events
//! ```
//!
//! Commands take `&Database` rather than the router state so they can be
//! driven directly from tests.

pub mod sale;

pub use sale::{
    cancel_sale, checkout_sale, create_sale, get_sale, list_sale_events, list_sales,
    update_sale,
};
