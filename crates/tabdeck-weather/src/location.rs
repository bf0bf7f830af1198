//! Device position lookup.

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{Coordinate, LocationError};

/// Anything that can report where the device is.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Ask `source` for a position, giving up after `timeout`.
pub async fn locate(
    source: &dyn PositionSource,
    timeout: Duration,
) -> Result<Coordinate, LocationError> {
    match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Position request timed out after {:?}", timeout);
            Err(LocationError::Timeout)
        }
    }
}

/// A position supplied up front (command line, config). `None` behaves like
/// a device with location services turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(pub Option<Coordinate>);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.0.ok_or(LocationError::ServiceUnavailable)
    }
}
