//! Configuration tables for scoring, selection, clustering, refinement, and routing.
//!
//! Every stage takes its slice of [`PlannerConfig`] at construction time, so tests can
//! substitute any table without touching global state. `Default` reproduces the
//! production tables.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{Depot, Persona};
use crate::selection::SelectionPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Complete planner configuration.
pub struct PlannerConfig {
    /// Priority score weights.
    pub weights: ScoreWeights,
    /// Persona to risk multiplier table.
    pub persona_risk: PersonaRiskTable,
    /// Active pickup selection policy.
    pub selection: SelectionPolicy,
    /// K-means parameters.
    pub clustering: ClusteringConfig,
    /// 2-opt and cost model parameters.
    pub refinement: RefinementConfig,
    /// Road-geometry provider parameters.
    pub routing: RoutingConfig,
    /// Feedback report parameters.
    pub feedback: FeedbackConfig,
    /// Depot used when a request does not name one.
    pub depot: Option<Depot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Weights of the priority score terms. They sum to one.
pub struct ScoreWeights {
    /// Weight of the normalised fill level.
    pub fill: f64,
    /// Weight of the overflow probability.
    pub probability: f64,
    /// Weight of the persona term.
    pub persona: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            fill: 0.5,
            probability: 0.3,
            persona: 0.2,
        }
    }
}

/// Multiplier used for personas missing from the table.
pub const NEUTRAL_RISK_MULTIPLIER: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
/// Risk multiplier per persona. Keys are matched without regard to case.
pub struct PersonaRiskTable {
    multipliers: BTreeMap<Persona, f64>,
}

impl PersonaRiskTable {
    /// Build a table from explicit entries.
    #[must_use]
    pub fn new<I: IntoIterator<Item = (Persona, f64)>>(entries: I) -> Self {
        Self {
            multipliers: entries.into_iter().collect(),
        }
    }

    /// Multiplier for the persona; unknown personas get [`NEUTRAL_RISK_MULTIPLIER`].
    #[must_use]
    pub fn multiplier(&self, persona: &Persona) -> f64 {
        self.multipliers
            .get(persona)
            .copied()
            .unwrap_or(NEUTRAL_RISK_MULTIPLIER)
    }
}

impl<'de> Deserialize<'de> for PersonaRiskTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Ok(Self::new(
            raw.into_iter()
                .map(|(key, multiplier)| (Persona::from_table_key(&key), multiplier)),
        ))
    }
}

impl Default for PersonaRiskTable {
    fn default() -> Self {
        Self::new([
            (Persona::FoodCourt, 1.5),
            (Persona::Hostel, 1.2),
            (Persona::Academic, 0.8),
            (Persona::Park, 0.9),
            (Persona::Default, 1.0),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Parameters of the k-means partitioning.
pub struct ClusteringConfig {
    /// Seed of the centroid initialisation.
    pub seed: u64,
    /// Independent runs; the lowest-inertia run wins.
    pub restarts: usize,
    /// Upper bound on Lloyd iterations per run.
    pub max_iterations: u64,
    /// Convergence tolerance on centroid movement.
    pub tolerance: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            restarts: 10,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Parameters of the 2-opt refinement and its cost model.
pub struct RefinementConfig {
    /// Maximum number of improvement scans.
    pub iterations: usize,
    /// Cost per unit of planar distance.
    pub fuel_factor: f64,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            fuel_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Road-geometry provider settings.
pub struct RoutingConfig {
    /// Base URL of the routing service.
    pub base_url: String,
    /// Routing profile segment of the request path.
    pub profile: String,
    /// Per-leg request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl RoutingConfig {
    /// Per-leg request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://router.project-osrm.org"),
            profile: String::from("driving"),
            timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Range of the simulated error rate quoted by the feedback report.
pub struct FeedbackConfig {
    /// Lower bound, as a fraction.
    pub min_error_rate: f64,
    /// Upper bound, as a fraction.
    pub max_error_rate: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            min_error_rate: 0.02,
            max_error_rate: 0.05,
        }
    }
}
