//! Decoy Vault - Configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};
use crate::store::validate_key;

/// Storage key of the single vault slot
pub const DEFAULT_STORAGE_KEY: &str = "secret_locked_image_v1";

/// Environment variable overriding `store_dir`
pub const STORE_DIR_ENV: &str = "DECOY_VAULT_DIR";

/// Vault configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Directory backing the file store
    pub store_dir: PathBuf,
    /// Key the envelope is stored under
    pub storage_key: String,
    /// Largest image file accepted
    pub max_image_bytes: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("./decoy_vault_data"),
            storage_key: DEFAULT_STORAGE_KEY.into(),
            max_image_bytes: 32 * 1024 * 1024,
        }
    }
}

impl VaultConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> VaultResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| VaultError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DECOY_VAULT_DIR` if set
    pub fn with_env(mut self) -> Self {
        if let Some(dir) = std::env::var_os(STORE_DIR_ENV) {
            if !dir.is_empty() {
                self.store_dir = PathBuf::from(dir);
            }
        }
        self
    }

    pub fn validate(&self) -> VaultResult<()> {
        validate_key(&self.storage_key)?;
        if self.max_image_bytes == 0 {
            return Err(VaultError::ConfigError("max_image_bytes must be positive".into()));
        }
        Ok(())
    }
}
