//! End-to-end pipeline behaviour against in-memory road-geometry backends.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use binroute_core::{
    Bin, Depot, FillLevel, GeoPoint, Located, OptimizeRequest, Persona, PlannerConfig, PortError,
    RoadGeometryPort, RoutePlanner, SelectionPolicy, StraightLinePort, Stop,
};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;

const EPSILON: f64 = 1e-9;

/// Adds a midpoint to every leg except those starting at `broken_origin`.
struct OneBrokenLeg {
    broken_origin: GeoPoint,
}

#[async_trait]
impl RoadGeometryPort for OneBrokenLeg {
    fn name(&self) -> &str {
        "one-broken-leg"
    }

    async fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, PortError> {
        if from == self.broken_origin {
            return Err(PortError::Status(503));
        }
        let midpoint = GeoPoint::new((from.lat + to.lat) / 2.0, (from.lon + to.lon) / 2.0);
        Ok(vec![from, midpoint, to])
    }
}

fn planner() -> RoutePlanner {
    RoutePlanner::new(PlannerConfig::default(), Arc::new(StraightLinePort))
}

fn request(vehicles: usize) -> OptimizeRequest {
    OptimizeRequest {
        date: NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date"),
        vehicle_count: NonZeroUsize::new(vehicles).expect("non-zero vehicles"),
        depot: None,
    }
}

fn scenario_a_bins() -> Vec<Bin> {
    vec![
        Bin::new("B1", GeoPoint::new(31.2560, 75.7040), 10.0, Persona::Academic),
        Bin::new("B2", GeoPoint::new(31.2575, 75.7072), 90.0, Persona::FoodCourt),
        Bin::new("B3", GeoPoint::new(31.2531, 75.7055), 95.0, Persona::FoodCourt),
    ]
}

/// Bins spread over two neighbourhoods, all full enough to be selected.
fn campus_bins() -> Vec<Bin> {
    let mut bins = Vec::new();
    for idx in 0..12_u32 {
        let offset = f64::from(idx) * 0.0007;
        let (lat, lon) = if idx % 2 == 0 {
            (31.250 + offset, 75.700 + offset / 2.0)
        } else {
            (31.270 - offset / 3.0, 75.720 + offset)
        };
        bins.push(Bin::new(
            format!("C{idx}"),
            GeoPoint::new(lat, lon),
            70.0 + f64::from(idx),
            Persona::Hostel,
        ));
    }
    bins
}

fn bin_ids(stops: &[Stop]) -> Vec<String> {
    stops
        .iter()
        .filter(|stop| !stop.is_depot())
        .map(|stop| stop.id().to_owned())
        .collect()
}

#[test]
fn scenario_a_scores_and_selection() {
    let planner = planner();
    let bins = scenario_a_bins();

    let scores: Vec<f64> = planner.assess(&bins).iter().map(|scored| scored.priority).collect();
    assert!((scores[0] - 15.4).abs() < EPSILON);
    assert!((scores[1] - 89.7).abs() < EPSILON);
    assert!((scores[2] - 92.2).abs() < EPSILON);

    let routes = planner
        .plan_waypoints(&bins, 1, &Depot::default())
        .expect("planning should succeed");

    assert_eq!(routes.len(), 1);
    let visited: BTreeSet<_> = bin_ids(&routes[0].stops).into_iter().collect();
    assert_eq!(visited, BTreeSet::from(["B2".to_owned(), "B3".to_owned()]));
}

#[test]
fn scenario_b_extra_vehicles_are_dropped() {
    let planner = planner();
    let bins = scenario_a_bins();

    let routes = planner
        .plan_waypoints(&bins, 5, &Depot::default())
        .expect("planning should succeed");

    assert_eq!(routes.len(), 2);
    for (idx, route) in routes.iter().enumerate() {
        assert_eq!(route.vehicle, idx);
        assert_eq!(route.bin_count(), 1);
    }
}

#[tokio::test]
async fn scenario_c_failed_leg_keeps_two_endpoints() {
    let bin_location = GeoPoint::new(31.2575, 75.7072);
    let bins = vec![Bin::new("B2", bin_location, 90.0, Persona::FoodCourt)];
    let depot = Depot::default();
    let planner = RoutePlanner::new(
        PlannerConfig::default(),
        Arc::new(OneBrokenLeg {
            broken_origin: bin_location,
        }),
    );

    let plan = planner
        .optimize(&bins, &request(1))
        .await
        .expect("planning should succeed");

    let midpoint = GeoPoint::new(
        (depot.location.lat + bin_location.lat) / 2.0,
        (depot.location.lon + bin_location.lon) / 2.0,
    );
    assert_eq!(plan.routes.len(), 1);
    assert_eq!(
        plan.routes[0].path,
        vec![
            depot.location,
            midpoint,
            bin_location,
            // fallback leg: exactly its two endpoints
            bin_location,
            depot.location,
        ]
    );
}

#[tokio::test]
async fn scenario_d_nothing_to_collect() {
    let planner = planner();

    let empty = planner
        .optimize(&[], &request(2))
        .await
        .expect("planning should succeed");
    assert!(empty.routes.is_empty());
    assert!(empty.feedback.is_none());

    let quiet = vec![
        Bin::new("Q1", GeoPoint::new(31.25, 75.70), 5.0, Persona::Academic),
        Bin::new("Q2", GeoPoint::new(31.26, 75.71), FillLevel::parse("n/a"), Persona::Park),
    ];
    let plan = planner
        .optimize(&quiet, &request(2))
        .await
        .expect("planning should succeed");
    assert!(plan.routes.is_empty());
}

#[test]
fn routes_partition_selected_bins_and_close_at_depot() {
    let planner = planner();
    let bins = campus_bins();
    let depot = Depot::default();

    let routes = planner
        .plan_waypoints(&bins, 3, &depot)
        .expect("planning should succeed");

    let mut visited = Vec::new();
    for route in &routes {
        assert_eq!(route.stops.first().map(Located::location), Some(depot.location));
        assert_eq!(route.stops.last().map(Located::location), Some(depot.location));
        assert!(route.stops.first().is_some_and(Stop::is_depot));
        assert!(route.stops.last().is_some_and(Stop::is_depot));
        assert!(route.bin_count() > 0);
        visited.extend(bin_ids(&route.stops));
    }

    let unique: BTreeSet<_> = visited.iter().cloned().collect();
    assert_eq!(unique.len(), visited.len(), "a bin was visited twice");

    let selected: BTreeSet<_> = planner
        .assess(&bins)
        .into_iter()
        .filter(|scored| scored.priority > 35.0)
        .map(|scored| scored.bin.id.0)
        .collect();
    assert_eq!(unique, selected);
}

#[test]
fn planning_is_deterministic() {
    let planner = planner();
    let bins = campus_bins();
    let depot = Depot::default();

    let first = planner.plan_waypoints(&bins, 3, &depot).expect("planning should succeed");
    let second = planner.plan_waypoints(&bins, 3, &depot).expect("planning should succeed");

    assert_eq!(first, second);
}

#[tokio::test]
async fn request_depot_overrides_default() {
    let planner = planner();
    let custom = Depot {
        id: "YARD".to_owned(),
        name: "North Yard".to_owned(),
        location: GeoPoint::new(31.2700, 75.7000),
    };
    let mut req = request(1);
    req.depot = Some(custom.clone());

    let plan = planner
        .optimize_with_rng(&scenario_a_bins(), &req, &mut StdRng::seed_from_u64(1))
        .await
        .expect("planning should succeed");

    let route = &plan.routes[0];
    assert_eq!(route.stops.first().map(Stop::id), Some("YARD"));
    assert_eq!(route.path.first(), Some(&custom.location));
    assert_eq!(route.path.last(), Some(&custom.location));
    assert_eq!(plan.requested_vehicles, 1);
    assert!(plan.feedback.is_some());
}

#[test]
fn legacy_policy_selects_by_raw_fill() {
    let config = PlannerConfig {
        selection: SelectionPolicy::legacy(),
        ..PlannerConfig::default()
    };
    let planner = RoutePlanner::new(config, Arc::new(StraightLinePort));
    let bins = vec![
        Bin::new("FC", GeoPoint::new(31.25, 75.70), 25.0, Persona::FoodCourt),
        Bin::new("AC", GeoPoint::new(31.26, 75.71), 30.0, Persona::Academic),
    ];

    let routes = planner
        .plan_waypoints(&bins, 1, &Depot::default())
        .expect("planning should succeed");

    assert_eq!(routes.len(), 1);
    assert_eq!(bin_ids(&routes[0].stops), ["FC"]);
}
