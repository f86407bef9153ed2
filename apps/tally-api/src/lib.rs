//! # tally-api: HTTP Service
//!
//! Serves the sales-order API over axum.
//!
//! ## Module Structure
//! ```text
//! tally-api/src/
//! ├── lib.rs          ◄─── You are here (router, tracing setup)
//! ├── main.rs         ◄─── Binary: config, database, listener, shutdown
//! ├── config.rs       ◄─── TOML file + TALLY_* environment overrides
//! ├── error.rs        ◄─── ApiError → HTTP status + JSON envelope
//! ├── dto.rs          ◄─── Request/response bodies, request validation
//! ├── state.rs        ◄─── AppState shared with handlers
//! ├── commands/       ◄─── Use cases over tally-core and tally-db
//! └── routes/         ◄─── axum handlers
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  client ──HTTP──► TraceLayer ──► routes::sales::* (extract, envelope)  │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                                commands::sale::*                        │
//! │                                   │          │                          │
//! │                         Sale (tally-core)   Database (tally-db)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::router;
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
