//! Maintenance scripts
//!
//! Each script is a library function over an explicitly passed store handle
//! plus a flag-less binary. Setup problems (missing credentials) are fatal;
//! per-record problems are logged and skipped.

pub mod integrity;
pub mod logging;
pub mod scoring;
pub mod seeding;
pub mod status;
pub mod verify;

use anyhow::Context;
use fantasy_store::{open_store, DocumentStore, StoreConfig};
use std::sync::Arc;

/// Load `.env`, initialize logging and open the configured store
pub fn bootstrap(script: &str) -> anyhow::Result<Arc<dyn DocumentStore>> {
    dotenv::dotenv().ok();
    logging::initialize_logging()?;

    tracing::info!("Starting {}", script);

    let config = StoreConfig::from_env().context("Missing or invalid store configuration")?;
    let store = open_store(&config).context("Failed to open document store")?;
    Ok(store)
}
