//! Route cost model and 2-opt local search.

use crate::config::RefinementConfig;
use crate::model::{GeoPoint, Located};

/// Improvements smaller than this are float noise, not progress.
const IMPROVEMENT_EPSILON: f64 = 1e-12;

/// Objective minimised by the refiner.
pub trait CostModel {
    /// Cost of driving directly from `from` to `to`.
    fn leg_cost(&self, from: GeoPoint, to: GeoPoint) -> f64;

    /// Sum of leg costs over consecutive stops.
    fn route_cost<T: Located>(&self, route: &[T]) -> f64
    where
        Self: Sized,
    {
        route
            .windows(2)
            .map(|pair| match pair {
                [from, to] => self.leg_cost(from.location(), to.location()),
                _ => 0.0,
            })
            .sum()
    }
}

/// Planar distance scaled by a fuel factor.
///
/// Only driving enters the objective; overflow risk is not priced in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceFuelCost {
    fuel_factor: f64,
}

impl DistanceFuelCost {
    /// Create a cost model with the given fuel factor.
    #[must_use]
    pub const fn new(fuel_factor: f64) -> Self {
        Self { fuel_factor }
    }
}

impl Default for DistanceFuelCost {
    fn default() -> Self {
        Self::new(RefinementConfig::default().fuel_factor)
    }
}

impl CostModel for DistanceFuelCost {
    fn leg_cost(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        from.euclidean_to(&to) * self.fuel_factor
    }
}

/// First-improvement 2-opt over a closed route.
#[derive(Debug, Clone, Copy)]
pub struct TwoOptRefiner<C> {
    cost_model: C,
    iterations: usize,
}

impl<C: CostModel> TwoOptRefiner<C> {
    /// Create a refiner with a scan budget.
    #[must_use]
    pub const fn new(cost_model: C, iterations: usize) -> Self {
        Self {
            cost_model,
            iterations,
        }
    }

    /// The objective used by this refiner.
    #[must_use]
    pub const fn cost_model(&self) -> &C {
        &self.cost_model
    }

    /// Improve a closed route whose first and last entries are the depot.
    ///
    /// Each scan reverses the segment `i..=j` for `1 <= i` and `i + 2 <= j <= len - 2`
    /// and accepts the first strictly cheaper candidate, then rescans. Stops when a
    /// scan finds nothing or the budget runs out. The endpoints never move, and the
    /// result never costs more than the input.
    #[must_use]
    pub fn refine<T: Located + Clone>(&self, route: &[T]) -> Vec<T> {
        let len = route.len();
        let mut best = route.to_vec();
        let mut best_cost = self.cost_model.route_cost(&best);
        let mut candidate: Vec<T> = Vec::with_capacity(len);

        let mut scans = 0;
        let mut improved = true;
        while improved && scans < self.iterations {
            improved = false;
            scans += 1;

            'scan: for i in 1..len.saturating_sub(2) {
                for j in i + 2..len - 1 {
                    candidate.clear();
                    candidate.extend_from_slice(&best);
                    if let Some(segment) = candidate.get_mut(i..=j) {
                        segment.reverse();
                    }

                    let cost = self.cost_model.route_cost(&candidate);
                    if cost + IMPROVEMENT_EPSILON < best_cost {
                        std::mem::swap(&mut best, &mut candidate);
                        best_cost = cost;
                        improved = true;
                        break 'scan;
                    }
                }
            }
        }

        best
    }
}
