pub mod app;
pub mod config;
pub mod error;
pub mod storage;

pub use app::App;
pub use config::{CalendarConfig, Config, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, NetworkError, StorageError, WeatherError};
pub use storage::{Entries, JsonFileStore, KeyValueStore, KeyValueStoreExt, MemoryStore, Stores};

use anyhow::Result;

/// Initialize logging
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Tabdeck core initialized");
    Ok(())
}
