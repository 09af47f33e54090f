//! Persistence module split across logical submodules.

mod connection;
mod seed;
mod toys;

pub use connection::{ensure_schema, initialize_schema, open_database, DatabaseLocation};
pub use seed::{load_or_seed_toys, seed_if_empty, SEED_TOYS};
pub use toys::{
    create_toy, delete_toy, fetch_sorted_toys, fetch_toy, fetch_toys, search_toys, update_toy,
};
