use anyhow::Result;
use std::sync::Arc;

use crate::storage::Stores;
use crate::Config;

/// Loaded configuration plus the stores it points at.
pub struct App {
    config: Arc<Config>,
    stores: Stores,
}

impl App {
    /// Load and validate the config file, then open the file-backed stores
    pub fn new() -> Result<Self> {
        let (config, _) = Config::load_validated()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        let stores = Stores::open(&config.data_dir);
        tracing::info!("Using data directory {}", config.data_dir.display());

        Self {
            config: Arc::new(config),
            stores,
        }
    }

    /// Build an app around explicit stores (tests, throwaway sessions)
    pub fn with_stores(config: Config, stores: Stores) -> Self {
        Self {
            config: Arc::new(config),
            stores,
        }
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }
}
