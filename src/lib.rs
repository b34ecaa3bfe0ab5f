pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use db::Database;
pub use error::{AppError, AppResult};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize the global tracing subscriber. Level comes from `RUST_LOG`
/// (defaults to `info`). Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    // Another subscriber may already be installed (tests, embedding app).
    let _ = tracing::subscriber::set_global_default(subscriber);
}
