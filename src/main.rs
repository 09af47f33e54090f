//! Binary entry point: load settings, start logging, open and seed the store,
//! then hand the connection to the Ratatui event loop.
use toy_store_manager::config::default_config_path;
use toy_store_manager::{ensure_schema, init_logging, load_config, load_or_seed_toys, run_app, App};

/// Startup failures (unreadable config, unwritable data directory, broken
/// database) propagate out of `main` so the error chain is printed.
fn main() -> anyhow::Result<()> {
    let config_path = default_config_path();
    let config = load_config(Some(config_path.as_path()))?;
    init_logging(&config)?;
    tracing::info!(config = %config_path.display(), "toy store starting");

    let conn = ensure_schema(&config.database_url)?;
    let toys = load_or_seed_toys(&conn)?;

    let mut app = App::new(conn, toys);
    run_app(&mut app)
}
