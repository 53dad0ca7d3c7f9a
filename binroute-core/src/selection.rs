//! Policies deciding which bins are collected this cycle.

use serde::{Deserialize, Serialize};

use crate::model::{Persona, ScoredBin};

/// Priority score a bin must exceed under the canonical policy.
pub const DEFAULT_PRIORITY_THRESHOLD: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
/// Selection rule. Exactly one is active per planner.
pub enum SelectionPolicy {
    /// Select bins whose priority score exceeds `threshold`. Canonical.
    PriorityScore {
        /// Exclusive lower bound on the score.
        threshold: f64,
    },
    /// Legacy raw fill-level cutoff with a lower bar for food courts.
    ///
    /// Ignores overflow risk entirely. Kept for comparison runs only.
    FillLevel {
        /// Exclusive fill threshold for food courts, in percent.
        high_turnover_threshold: f64,
        /// Exclusive fill threshold for every other persona, in percent.
        default_threshold: f64,
    },
}

impl SelectionPolicy {
    /// The legacy policy with its historical thresholds.
    #[must_use]
    pub const fn legacy() -> Self {
        Self::FillLevel {
            high_turnover_threshold: 20.0,
            default_threshold: 40.0,
        }
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::PriorityScore {
            threshold: DEFAULT_PRIORITY_THRESHOLD,
        }
    }
}

/// Filters scored bins down to those requiring collection.
#[derive(Debug, Clone, Copy)]
pub struct PickupSelector<'cfg> {
    policy: &'cfg SelectionPolicy,
}

impl<'cfg> PickupSelector<'cfg> {
    /// Create a selector for the given policy.
    #[must_use]
    pub const fn new(policy: &'cfg SelectionPolicy) -> Self {
        Self { policy }
    }

    /// Whether the bin must be collected.
    #[must_use]
    pub fn requires_pickup(&self, scored: &ScoredBin) -> bool {
        match *self.policy {
            SelectionPolicy::PriorityScore { threshold } => scored.priority > threshold,
            SelectionPolicy::FillLevel {
                high_turnover_threshold,
                default_threshold,
            } => {
                let threshold = if scored.bin.persona == Persona::FoodCourt {
                    high_turnover_threshold
                } else {
                    default_threshold
                };
                scored.bin.fill_level.percent() > threshold
            }
        }
    }

    /// Keep the bins requiring pickup, preserving input order.
    #[must_use]
    pub fn select(&self, scored: Vec<ScoredBin>) -> Vec<ScoredBin> {
        scored
            .into_iter()
            .filter(|candidate| self.requires_pickup(candidate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bin, GeoPoint};

    fn scored(id: &str, fill: f64, persona: Persona, priority: f64) -> ScoredBin {
        ScoredBin {
            bin: Bin::new(id, GeoPoint::new(0.0, 0.0), fill, persona),
            overflow_probability: 0.0,
            hours_to_critical: 0.0,
            priority,
        }
    }

    #[test]
    fn priority_policy_is_strict_and_ignores_fill() {
        let policy = SelectionPolicy::default();
        let selector = PickupSelector::new(&policy);

        let picked = selector.select(vec![
            scored("at-threshold", 90.0, Persona::Default, 35.0),
            scored("above", 5.0, Persona::Default, 35.1),
            scored("below", 98.0, Persona::Default, 12.0),
        ]);

        let ids: Vec<_> = picked.iter().map(|bin| bin.bin.id.0.as_str()).collect();
        assert_eq!(ids, ["above"]);
    }

    #[test]
    fn legacy_policy_uses_persona_thresholds() {
        let policy = SelectionPolicy::legacy();
        let selector = PickupSelector::new(&policy);

        assert!(selector.requires_pickup(&scored("fc", 25.0, Persona::FoodCourt, 0.0)));
        assert!(!selector.requires_pickup(&scored("fc", 20.0, Persona::FoodCourt, 99.0)));
        assert!(!selector.requires_pickup(&scored("h", 35.0, Persona::Hostel, 99.0)));
        assert!(selector.requires_pickup(&scored("h", 41.0, Persona::Hostel, 0.0)));
    }
}
