//! Expansion of waypoint tours into road geometry.

use tracing::{debug, warn};

use crate::model::GeoPoint;
use crate::ports::RoadGeometryPort;

/// Drives a [`RoadGeometryPort`] leg by leg with per-leg straight-line fallback.
pub struct RoadPathResolver<'port> {
    port: &'port dyn RoadGeometryPort,
}

impl<'port> RoadPathResolver<'port> {
    /// Create a resolver over the given backend.
    #[must_use]
    pub fn new(port: &'port dyn RoadGeometryPort) -> Self {
        Self { port }
    }

    /// Expand consecutive waypoint pairs into road geometry.
    ///
    /// Legs are fetched sequentially. A leg whose fetch fails, or returns no points,
    /// contributes its two endpoints instead; the remaining legs are still fetched.
    /// Fewer than two waypoints yield an empty path.
    pub async fn resolve(&self, waypoints: &[GeoPoint]) -> Vec<GeoPoint> {
        let mut path = Vec::new();

        for (leg, pair) in waypoints.windows(2).enumerate() {
            let &[from, to] = pair else {
                continue;
            };

            match self.port.leg(from, to).await {
                Ok(segment) if !segment.is_empty() => {
                    debug!(leg, points = segment.len(), "leg resolved");
                    path.extend(segment);
                }
                Ok(_) => {
                    warn!(leg, port = self.port.name(), "empty leg geometry, using straight line");
                    path.extend([from, to]);
                }
                Err(err) => {
                    warn!(leg, port = self.port.name(), error = %err, "leg lookup failed, using straight line");
                    path.extend([from, to]);
                }
            }
        }

        path
    }
}
