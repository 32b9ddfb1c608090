pub mod pool;

pub use pool::{check_db_health, create_db_pool, run_migrations};
