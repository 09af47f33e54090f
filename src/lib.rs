//! Core library surface for the Toy Store Manager TUI application.
//!
//! The `bin` target only wires these pieces together; tests and other tools
//! can reach the record-access layer directly.
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod ui;

/// Persistence entry points: open/seed the store and the record-access
/// operations.
pub use db::{
    create_toy, delete_toy, ensure_schema, fetch_sorted_toys, fetch_toy, fetch_toys,
    load_or_seed_toys, search_toys, update_toy,
};

pub use config::{load_config, AppConfig, ConfigError};
pub use logging::init_logging;
pub use models::{SortDirection, SortField, SortOrder, Toy, ToyFields};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
