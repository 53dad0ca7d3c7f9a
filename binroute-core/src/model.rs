//! Domain data structures for bins, depots, waypoint stops, and planned routes.

use std::fmt;
use std::num::NonZeroUsize;

use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::feedback::FeedbackReport;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic coordinate in decimal degrees.
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar distance on raw latitude/longitude. Adequate at city scale only.
    #[must_use]
    pub fn euclidean_to(&self, other: &GeoPoint) -> f64 {
        (self.lat - other.lat).hypot(self.lon - other.lon)
    }
}

/// Anything that sits at a single geographic coordinate.
pub trait Located {
    /// Coordinate of the item.
    fn location(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn location(&self) -> GeoPoint {
        *self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
/// Usage category of a bin, driving its risk multiplier.
///
/// Wire tags match exactly. A missing tag, `null`, or a non-string value decodes
/// as [`Persona::Default`].
pub enum Persona {
    /// High-turnover food service area.
    FoodCourt,
    /// Student housing.
    Hostel,
    /// Lecture and office blocks.
    Academic,
    /// Parks and green spaces.
    Park,
    /// Sports grounds.
    Ground,
    /// Untagged bin.
    #[default]
    Default,
    /// Tag not known to the planner.
    Other(String),
}

impl Persona {
    /// Wire name of the persona.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::FoodCourt => "Food Court",
            Self::Hostel => "Hostel",
            Self::Academic => "Academic",
            Self::Park => "Park",
            Self::Ground => "Ground",
            Self::Default => "Default",
            Self::Other(raw) => raw,
        }
    }

    /// Parse a multiplier-table key, ignoring ASCII case.
    ///
    /// Settings loaded through the `config` crate arrive with lower-cased keys.
    #[must_use]
    pub fn from_table_key(key: &str) -> Self {
        let key = key.trim();
        [
            Self::FoodCourt,
            Self::Hostel,
            Self::Academic,
            Self::Park,
            Self::Ground,
            Self::Default,
        ]
        .into_iter()
        .find(|known| known.as_str().eq_ignore_ascii_case(key))
        .unwrap_or_else(|| Self::Other(key.to_owned()))
    }
}

impl From<String> for Persona {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Food Court" => Self::FoodCourt,
            "Hostel" => Self::Hostel,
            "Academic" => Self::Academic,
            "Park" => Self::Park,
            "Ground" => Self::Ground,
            "Default" | "" => Self::Default,
            _ => Self::Other(raw),
        }
    }
}

impl<'de> Deserialize<'de> for Persona {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPersona {
            Tag(String),
            Other(IgnoredAny),
        }

        Ok(match RawPersona::deserialize(deserializer)? {
            RawPersona::Tag(raw) => Self::from(raw),
            RawPersona::Other(_) => Self::default(),
        })
    }
}

impl From<&str> for Persona {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<Persona> for String {
    fn from(persona: Persona) -> Self {
        match persona {
            Persona::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Fill level in percent.
///
/// Construction is total: numbers are taken as-is, numeric strings are parsed,
/// and anything else (missing, null, text, non-finite values) becomes `0.0`.
/// Values are not clamped to `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct FillLevel(f64);

impl FillLevel {
    /// Wrap a raw percentage; non-finite input becomes zero.
    #[must_use]
    pub fn new(percent: f64) -> Self {
        if percent.is_finite() {
            Self(percent)
        } else {
            Self(0.0)
        }
    }

    /// Parse a textual reading, falling back to zero.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.trim().parse::<f64>().map_or(Self(0.0), Self::new)
    }

    /// Fill level in percent.
    #[must_use]
    pub const fn percent(self) -> f64 {
        self.0
    }

    /// Fill level as a fraction of full.
    #[must_use]
    pub fn ratio(self) -> f64 {
        self.0 / 100.0
    }
}

impl From<f64> for FillLevel {
    fn from(percent: f64) -> Self {
        Self::new(percent)
    }
}

impl<'de> Deserialize<'de> for FillLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawFill {
            Number(f64),
            Text(String),
            Other(IgnoredAny),
        }

        Ok(match RawFill::deserialize(deserializer)? {
            RawFill::Number(percent) => Self::new(percent),
            RawFill::Text(raw) => Self::parse(&raw),
            RawFill::Other(_) => Self::default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of a bin.
pub struct BinId(pub String);

impl fmt::Display for BinId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Telemetry snapshot of a single bin.
pub struct Bin {
    /// Unique identifier.
    #[serde(rename = "bin_id")]
    pub id: BinId,
    /// Latitude of the bin.
    pub latitude: f64,
    /// Longitude of the bin.
    pub longitude: f64,
    /// Current fill reading.
    #[serde(default)]
    pub fill_level: FillLevel,
    /// Usage category.
    #[serde(rename = "type", default)]
    pub persona: Persona,
}

impl Bin {
    /// Construct a bin record.
    #[must_use]
    pub fn new<S: Into<String>>(
        id: S,
        location: GeoPoint,
        fill_level: impl Into<FillLevel>,
        persona: Persona,
    ) -> Self {
        Self {
            id: BinId(id.into()),
            latitude: location.lat,
            longitude: location.lon,
            fill_level: fill_level.into(),
            persona,
        }
    }
}

impl Located for Bin {
    fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Start and end point of every vehicle route.
pub struct Depot {
    /// Identifier, distinct from any bin.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Coordinate of the depot.
    pub location: GeoPoint,
}

impl Depot {
    /// Waypoint-level stop for this depot.
    #[must_use]
    pub fn stop(&self) -> Stop {
        Stop::Depot {
            id: self.id.clone(),
            name: self.name.clone(),
            location: self.location,
        }
    }
}

impl Default for Depot {
    fn default() -> Self {
        Self {
            id: String::from("DEPOT"),
            name: String::from("UNI-SERVICES DEPOT"),
            location: GeoPoint::new(31.260_024, 75.706_270),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A bin together with the values derived from it by the risk model and scorer.
pub struct ScoredBin {
    /// Input record, untouched.
    pub bin: Bin,
    /// Overflow probability in `0.0..=1.0`.
    pub overflow_probability: f64,
    /// Hours until the bin reaches capacity.
    pub hours_to_critical: f64,
    /// Ranking scalar in `0.0..=100.0`.
    pub priority: f64,
}

impl ScoredBin {
    /// Waypoint-level stop for this bin.
    #[must_use]
    pub fn stop(&self) -> Stop {
        Stop::Bin {
            id: self.bin.id.clone(),
            location: self.bin.location(),
            fill_level: self.bin.fill_level,
            persona: self.bin.persona.clone(),
            priority: self.priority,
        }
    }
}

impl Located for ScoredBin {
    fn location(&self) -> GeoPoint {
        self.bin.location()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Waypoint of a route before road-geometry expansion.
pub enum Stop {
    /// The depot, first and last stop of every route.
    Depot {
        /// Depot identifier.
        id: String,
        /// Depot display name.
        name: String,
        /// Depot coordinate.
        #[serde(flatten)]
        location: GeoPoint,
    },
    /// A bin scheduled for pickup.
    Bin {
        /// Bin identifier.
        id: BinId,
        /// Bin coordinate.
        #[serde(flatten)]
        location: GeoPoint,
        /// Fill reading at planning time.
        fill_level: FillLevel,
        /// Usage category.
        persona: Persona,
        /// Priority score that got the bin selected.
        priority: f64,
    },
}

impl Stop {
    /// Identifier of the depot or bin at this stop.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Depot { id, .. } => id,
            Self::Bin { id, .. } => &id.0,
        }
    }

    /// Whether this stop is the depot.
    #[must_use]
    pub const fn is_depot(&self) -> bool {
        matches!(self, Self::Depot { .. })
    }
}

impl Located for Stop {
    fn location(&self) -> GeoPoint {
        match self {
            Self::Depot { location, .. } | Self::Bin { location, .. } => *location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Closed, refined tour for one vehicle, before road-geometry expansion.
pub struct WaypointRoute {
    /// Vehicle index; equals the route's position in the plan.
    pub vehicle: usize,
    /// Depot, bins, depot.
    pub stops: Vec<Stop>,
    /// Cost of the tour under the configured cost model.
    pub cost: f64,
}

impl WaypointRoute {
    /// Attach road geometry to the waypoint tour.
    #[must_use]
    pub fn with_path(self, path: Vec<GeoPoint>) -> PlannedRoute {
        PlannedRoute {
            vehicle: self.vehicle,
            stops: self.stops,
            cost: self.cost,
            path,
        }
    }

    /// Number of bins visited.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.stops.iter().filter(|stop| !stop.is_depot()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Route for one vehicle with its driven path.
pub struct PlannedRoute {
    /// Vehicle index; equals the route's position in the plan.
    pub vehicle: usize,
    /// Waypoint-level stops, depot first and last.
    pub stops: Vec<Stop>,
    /// Cost of the waypoint tour.
    pub cost: f64,
    /// Expanded geometry; coordinates only.
    pub path: Vec<GeoPoint>,
}

impl PlannedRoute {
    /// Number of bins visited.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.stops.iter().filter(|stop| !stop.is_depot()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Parameters of a single optimise call.
pub struct OptimizeRequest {
    /// Service date, echoed back in the plan.
    pub date: NaiveDate,
    /// Vehicles available; fewer may be used.
    pub vehicle_count: NonZeroUsize,
    /// Depot for this call; falls back to the configured depot.
    pub depot: Option<Depot>,
}

#[derive(Debug, Clone, Serialize)]
/// Result of a single optimise call.
pub struct RoutePlan {
    /// Service date from the request.
    pub date: NaiveDate,
    /// Vehicle count from the request.
    pub requested_vehicles: usize,
    /// One route per vehicle actually used, in vehicle order.
    pub routes: Vec<PlannedRoute>,
    /// Side-channel report; absent when nothing was planned.
    pub feedback: Option<FeedbackReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_bin(json: &str) -> Bin {
        serde_json::from_str(json).expect("bin should deserialize")
    }

    #[test]
    fn fill_level_accepts_numbers_and_numeric_text() {
        let numeric = parse_bin(r#"{"bin_id":"B1","latitude":1.0,"longitude":2.0,"fill_level":42}"#);
        let text = parse_bin(r#"{"bin_id":"B2","latitude":1.0,"longitude":2.0,"fill_level":" 42.5 "}"#);

        assert!((numeric.fill_level.percent() - 42.0).abs() < 1e-12);
        assert!((text.fill_level.percent() - 42.5).abs() < 1e-12);
    }

    #[test]
    fn malformed_fill_level_becomes_zero() {
        for raw in [r#""full""#, "null", "true", r#"{"x":1}"#, r#""NaN""#] {
            let json = format!(
                r#"{{"bin_id":"B","latitude":1.0,"longitude":2.0,"fill_level":{raw}}}"#
            );
            assert_eq!(parse_bin(&json).fill_level.percent(), 0.0, "input {raw}");
        }

        let missing = parse_bin(r#"{"bin_id":"B","latitude":1.0,"longitude":2.0}"#);
        assert_eq!(missing.fill_level.percent(), 0.0);
    }

    #[test]
    fn malformed_persona_becomes_default() {
        for raw in ["null", "3", "true", r#"["Hostel"]"#, r#"{"name":"Hostel"}"#] {
            let json = format!(
                r#"{{"bin_id":"B","latitude":1.0,"longitude":2.0,"fill_level":50,"type":{raw}}}"#
            );
            let bin = parse_bin(&json);
            assert_eq!(bin.persona, Persona::Default, "input {raw}");
            assert_eq!(bin.fill_level.percent(), 50.0, "input {raw}");
        }
    }

    #[test]
    fn snapshot_with_mixed_records_loads_every_bin() {
        let bins: Vec<Bin> = serde_json::from_str(
            r#"[
                {"bin_id":"B1","latitude":1.0,"longitude":2.0,"fill_level":80,"type":"Hostel"},
                {"bin_id":"B2","latitude":1.0,"longitude":2.0,"fill_level":80,"type":null},
                {"bin_id":"B3","latitude":1.0,"longitude":2.0,"fill_level":80,"type":7}
            ]"#,
        )
        .expect("snapshot should deserialize");

        let personas: Vec<_> = bins.into_iter().map(|bin| bin.persona).collect();
        assert_eq!(personas, [Persona::Hostel, Persona::Default, Persona::Default]);
    }

    #[test]
    fn persona_round_trips_wire_names() {
        let bin = parse_bin(
            r#"{"bin_id":"B","latitude":1.0,"longitude":2.0,"fill_level":1,"type":"Food Court"}"#,
        );
        assert_eq!(bin.persona, Persona::FoodCourt);
        assert_eq!(String::from(Persona::FoodCourt), "Food Court");

        let untagged = parse_bin(r#"{"bin_id":"B","latitude":1.0,"longitude":2.0}"#);
        assert_eq!(untagged.persona, Persona::Default);

        assert_eq!(Persona::from("Library"), Persona::Other("Library".to_owned()));
    }

    #[test]
    fn wire_tags_are_case_sensitive() {
        let shouted = parse_bin(
            r#"{"bin_id":"B","latitude":1.0,"longitude":2.0,"fill_level":1,"type":"FOOD COURT"}"#,
        );
        assert_eq!(shouted.persona, Persona::Other("FOOD COURT".to_owned()));
        assert_eq!(Persona::from("food court"), Persona::Other("food court".to_owned()));

        assert_eq!(Persona::from_table_key("food court"), Persona::FoodCourt);
        assert_eq!(Persona::from_table_key("HOSTEL"), Persona::Hostel);
        assert_eq!(Persona::from_table_key("library"), Persona::Other("library".to_owned()));
    }

    #[test]
    fn stops_serialize_with_flat_coordinates() {
        let depot = Depot::default();
        let value = serde_json::to_value(depot.stop()).expect("stop should serialize");

        assert_eq!(value["kind"], "depot");
        assert_eq!(value["id"], "DEPOT");
        assert_eq!(value["lat"], 31.260_024);
        assert_eq!(value["lon"], 75.706_270);
    }

    #[test]
    fn euclidean_distance() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert_eq!(origin.euclidean_to(&GeoPoint::new(3.0, 4.0)), 5.0);
    }
}
