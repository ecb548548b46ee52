//! Store configuration
//!
//! Server-side access needs the admin credentials JSON blob; everything else
//! has a default.

use crate::backend::{DocumentStore, InMemoryStore, LocalStore};
use crate::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

pub const CREDENTIALS_VAR: &str = "FANTASY_ADMIN_CREDENTIALS";
pub const DATA_DIR_VAR: &str = "FANTASY_DATA_DIR";
pub const BACKEND_VAR: &str = "FANTASY_STORE_BACKEND";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Local,
    Memory,
}

/// Admin service-account credentials
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl AdminCredentials {
    pub fn from_json(blob: &str) -> Result<Self> {
        let credentials: Self = serde_json::from_str(blob)
            .map_err(|e| StoreError::config(format!("{CREDENTIALS_VAR} is not valid JSON: {e}")))?;

        for (field, value) in [
            ("project_id", &credentials.project_id),
            ("client_email", &credentials.client_email),
            ("private_key", &credentials.private_key),
        ] {
            if value.trim().is_empty() {
                return Err(StoreError::config(format!("{CREDENTIALS_VAR}.{field} is empty")));
            }
        }
        Ok(credentials)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    pub credentials: AdminCredentials,
}

impl StoreConfig {
    pub fn new(credentials: AdminCredentials) -> Self {
        Self { backend: StoreBackend::Local, data_dir: PathBuf::from("./data"), credentials }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let blob = lookup(CREDENTIALS_VAR)
            .ok_or_else(|| StoreError::config(format!("{CREDENTIALS_VAR} not set")))?;
        let mut config = Self::new(AdminCredentials::from_json(&blob)?);

        if let Some(data_dir) = lookup(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Some(backend) = lookup(BACKEND_VAR) {
            config.backend = match backend.to_ascii_lowercase().as_str() {
                "local" => StoreBackend::Local,
                "memory" => StoreBackend::Memory,
                other => {
                    return Err(StoreError::config(format!("Invalid {BACKEND_VAR}: {other}")));
                }
            };
        }

        Ok(config)
    }
}

/// Build the store handle described by `config`
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    tracing::info!(
        "Opening {:?} document store for project {}",
        config.backend,
        config.credentials.project_id
    );
    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::Local => Arc::new(LocalStore::new(&config.data_dir)?),
        StoreBackend::Memory => Arc::new(InMemoryStore::new()),
    };
    Ok(store)
}
