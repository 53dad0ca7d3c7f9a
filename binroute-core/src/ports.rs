//! Traits describing the road-geometry provider and shared error types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::GeoPoint;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to a road-geometry backend.
pub enum PortError {
    /// Network layer failed, including timeouts.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Backend answered with a non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),
    /// Backend answered but reported a routing failure.
    #[error("Routing service error: {0}")]
    Service(String),
    /// Response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
/// Trait for backends that turn a single leg into road geometry.
pub trait RoadGeometryPort: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch the driven path from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend cannot be reached or answers with
    /// anything but a route.
    async fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, PortError>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Offline backend that draws every leg as a straight line.
pub struct StraightLinePort;

#[async_trait]
impl RoadGeometryPort for StraightLinePort {
    fn name(&self) -> &str {
        "straight-line"
    }

    async fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, PortError> {
        Ok(vec![from, to])
    }
}
