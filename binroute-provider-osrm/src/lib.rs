//! Road-geometry provider using the OSRM `route` service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use binroute_core::{
    config::RoutingConfig,
    model::GeoPoint,
    ports::{PortError, RoadGeometryPort},
};

/// Response from /route/v1/{profile}/{coordinates}
#[derive(Debug, Deserialize)]
struct RouteResponse {
    /// "Ok" on success, an error code such as "NoRoute" otherwise.
    code: String,
    #[serde(default)]
    routes: Vec<RouteEntry>,
    // waypoints / message are not needed
}

/// Single route alternative
#[derive(Debug, Deserialize)]
struct RouteEntry {
    geometry: Geometry,
}

/// GeoJSON line string, requested via `geometries=geojson`
#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[lon, lat]` pairs
    coordinates: Vec<[f64; 2]>,
}

/// Leg geometry lookup against an OSRM instance.
pub struct OsrmRoutePort {
    client: Client,
    base_url: String,
    profile: String,
    timeout: Duration,
}

impl OsrmRoutePort {
    /// Create a port against the public OSRM demo server with default settings.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::from_config(client, &RoutingConfig::default())
    }

    /// Create a port from routing settings.
    #[must_use]
    pub fn from_config(client: Client, config: &RoutingConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            profile: config.profile.clone(),
            timeout: config.timeout(),
        }
    }

    fn leg_url(&self, from: GeoPoint, to: GeoPoint) -> String {
        // OSRM wants lon,lat order
        format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.base_url, self.profile, from.lon, from.lat, to.lon, to.lat
        )
    }
}

#[async_trait]
impl RoadGeometryPort for OsrmRoutePort {
    fn name(&self) -> &str {
        "osrm"
    }

    async fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, PortError> {
        let req = self
            .client
            .get(self.leg_url(from, to))
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .timeout(self.timeout);

        let resp = fetch_json::<RouteResponse>(req).await?;

        if resp.code != "Ok" {
            return Err(PortError::Service(resp.code));
        }

        let route = resp
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| PortError::Malformed("no route in OSRM response".into()))?;

        Ok(route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| GeoPoint::new(lat, lon))
            .collect())
    }
}

/// Build a shareable OSRM port from routing settings.
#[must_use]
pub fn port(client: Client, config: &RoutingConfig) -> Arc<dyn RoadGeometryPort> {
    Arc::new(OsrmRoutePort::from_config(client, config))
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let resp = req.send().await.map_err(PortError::from)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(PortError::Status(status.as_u16()));
    }

    resp.json().await.map_err(|err| {
        if err.is_decode() {
            PortError::Malformed(err.to_string())
        } else {
            PortError::Network(err)
        }
    })
}
