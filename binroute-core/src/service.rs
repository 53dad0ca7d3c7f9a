//! High-level planner facade running the whole optimisation pipeline.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use crate::cluster::{ClusterError, Clusterer};
use crate::config::PlannerConfig;
use crate::feedback::FeedbackReporter;
use crate::model::{
    Bin, Depot, GeoPoint, Located, OptimizeRequest, RoutePlan, ScoredBin, WaypointRoute,
};
use crate::ports::RoadGeometryPort;
use crate::refine::{CostModel, DistanceFuelCost, TwoOptRefiner};
use crate::risk::{PriorityScorer, RiskModel};
use crate::road::RoadPathResolver;
use crate::selection::PickupSelector;
use crate::sequence::RouteSequencer;

#[derive(thiserror::Error, Debug)]
/// Errors that abort an optimise call.
pub enum PlanError {
    /// Bins could not be partitioned across vehicles.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

/// Public entry point for planning collection routes.
pub struct RoutePlanner {
    config: PlannerConfig,
    port: Arc<dyn RoadGeometryPort>,
}

impl RoutePlanner {
    /// Create a planner bound to a configuration and a road-geometry backend.
    #[must_use]
    pub fn new(config: PlannerConfig, port: Arc<dyn RoadGeometryPort>) -> Self {
        Self { config, port }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Depot for a request: the request's own, else the configured one, else the default.
    #[must_use]
    pub fn depot_for(&self, request: &OptimizeRequest) -> Depot {
        request
            .depot
            .clone()
            .or_else(|| self.config.depot.clone())
            .unwrap_or_default()
    }

    /// Score every bin, preserving input order.
    #[must_use]
    pub fn assess(&self, bins: &[Bin]) -> Vec<ScoredBin> {
        let scorer = PriorityScorer::new(
            RiskModel::new(&self.config.persona_risk),
            &self.config.weights,
        );
        bins.iter().map(|bin| scorer.assess(bin)).collect()
    }

    /// Run the pipeline up to refined waypoint tours, without touching the network.
    ///
    /// Route `k` in the result belongs to vehicle `k`. Clusters that k-means left
    /// empty are skipped, so fewer routes than vehicles may come back.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] when the selected bins cannot be clustered.
    pub fn plan_waypoints(
        &self,
        bins: &[Bin],
        vehicles: usize,
        depot: &Depot,
    ) -> Result<Vec<WaypointRoute>, PlanError> {
        let selected = PickupSelector::new(&self.config.selection).select(self.assess(bins));
        debug!(bins = bins.len(), selected = selected.len(), "pickup selection done");
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let points: Vec<GeoPoint> = selected.iter().map(Located::location).collect();
        let assignment = Clusterer::new(&self.config.clustering).assign(&points, vehicles)?;

        let refiner = TwoOptRefiner::new(
            DistanceFuelCost::new(self.config.refinement.fuel_factor),
            self.config.refinement.iterations,
        );

        let mut routes = Vec::with_capacity(assignment.cluster_count());
        for group in assignment.groups(&selected) {
            if group.is_empty() {
                continue;
            }

            let mut tour = Vec::with_capacity(group.len() + 2);
            tour.push(depot.stop());
            tour.extend(group.iter().map(ScoredBin::stop));

            let mut sequenced = RouteSequencer.sequence(&tour);
            sequenced.push(depot.stop());

            let initial_cost = refiner.cost_model().route_cost(&sequenced);
            let stops = refiner.refine(&sequenced);
            let cost = refiner.cost_model().route_cost(&stops);

            let vehicle = routes.len();
            debug!(vehicle, bins = group.len(), initial_cost, cost, "route refined");
            routes.push(WaypointRoute {
                vehicle,
                stops,
                cost,
            });
        }

        Ok(routes)
    }

    /// Plan routes for a bin snapshot and expand them into road geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] when the selected bins cannot be clustered. Road
    /// geometry failures never surface here.
    pub async fn optimize(
        &self,
        bins: &[Bin],
        request: &OptimizeRequest,
    ) -> Result<RoutePlan, PlanError> {
        let mut plan = self.expand(bins, request).await?;
        self.attach_feedback(&mut plan, &mut rand::thread_rng());
        Ok(plan)
    }

    /// Like [`RoutePlanner::optimize`], drawing the feedback report from `rng`.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] when the selected bins cannot be clustered.
    pub async fn optimize_with_rng<R: Rng + Send>(
        &self,
        bins: &[Bin],
        request: &OptimizeRequest,
        rng: &mut R,
    ) -> Result<RoutePlan, PlanError> {
        let mut plan = self.expand(bins, request).await?;
        self.attach_feedback(&mut plan, rng);
        Ok(plan)
    }

    fn attach_feedback<R: Rng>(&self, plan: &mut RoutePlan, rng: &mut R) {
        if plan.routes.is_empty() {
            return;
        }
        let report = FeedbackReporter::new(&self.config.feedback).report(&plan.routes, rng);
        debug!(%report, "feedback reported");
        plan.feedback = Some(report);
    }

    async fn expand(&self, bins: &[Bin], request: &OptimizeRequest) -> Result<RoutePlan, PlanError> {
        let depot = self.depot_for(request);
        let waypoint_routes = self.plan_waypoints(bins, request.vehicle_count.get(), &depot)?;

        let resolver = RoadPathResolver::new(self.port.as_ref());
        let mut routes = Vec::with_capacity(waypoint_routes.len());
        for route in waypoint_routes {
            let waypoints: Vec<GeoPoint> = route.stops.iter().map(Located::location).collect();
            let path = resolver.resolve(&waypoints).await;
            routes.push(route.with_path(path));
        }

        info!(
            date = %request.date,
            requested = request.vehicle_count.get(),
            routes = routes.len(),
            port = self.port.name(),
            "route plan ready"
        );

        Ok(RoutePlan {
            date: request.date,
            requested_vehicles: request.vehicle_count.get(),
            routes,
            feedback: None,
        })
    }
}
