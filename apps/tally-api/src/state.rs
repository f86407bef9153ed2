//! # Application State
//!
//! Shared by every route through axum's `State` extractor.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is already safe to share. Cloning
//! the state clones a pool handle, not the connections.

use tally_db::Database;

#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}
