//! Overflow risk estimation and the priority score built on top of it.
//!
//! Both are pure functions of a bin's fill level and persona; identical input always
//! yields identical output.

use serde::Serialize;

use crate::config::{PersonaRiskTable, ScoreWeights};
use crate::model::{Bin, ScoredBin};

/// Fill level at or above which a bin counts as full.
const FULL_THRESHOLD: f64 = 99.0;
/// Probability cap for bins below [`FULL_THRESHOLD`].
const MAX_PROBABILITY: f64 = 0.99;
/// Fill rate, in percent per hour, of a persona with multiplier 1.0.
const BASE_FILL_RATE: f64 = 5.0;
/// Fill rates at or below this are treated as stalled.
const STALLED_FILL_RATE: f64 = 0.1;
/// Hours reported for stalled bins.
const STALLED_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Output of [`RiskModel::predict`].
pub struct OverflowRisk {
    /// Probability that the bin overflows before the next cycle.
    pub probability: f64,
    /// Hours until the bin reaches capacity, one decimal.
    pub hours_to_critical: f64,
}

impl OverflowRisk {
    /// Risk of a bin that is already full.
    pub const FULL: Self = Self {
        probability: 1.0,
        hours_to_critical: 0.0,
    };
}

/// Persona-aware overflow estimator.
#[derive(Debug, Clone, Copy)]
pub struct RiskModel<'cfg> {
    personas: &'cfg PersonaRiskTable,
}

impl<'cfg> RiskModel<'cfg> {
    /// Create a model over the given multiplier table.
    #[must_use]
    pub const fn new(personas: &'cfg PersonaRiskTable) -> Self {
        Self { personas }
    }

    /// Risk multiplier of the bin's persona.
    #[must_use]
    pub fn multiplier(&self, bin: &Bin) -> f64 {
        self.personas.multiplier(&bin.persona)
    }

    /// Estimate overflow probability and time to critical for a bin.
    #[must_use]
    pub fn predict(&self, bin: &Bin) -> OverflowRisk {
        let fill = bin.fill_level.percent();
        if fill >= FULL_THRESHOLD {
            return OverflowRisk::FULL;
        }

        let multiplier = self.multiplier(bin);
        let probability = (bin.fill_level.ratio() * multiplier).clamp(0.0, MAX_PROBABILITY);

        let fill_rate = BASE_FILL_RATE * multiplier;
        let hours_to_critical = if fill_rate <= STALLED_FILL_RATE {
            STALLED_HOURS
        } else {
            round_to_tenth(((100.0 - fill) / fill_rate).max(0.0))
        };

        OverflowRisk {
            probability,
            hours_to_critical,
        }
    }
}

/// Combines fill level, overflow probability, and persona weight into one scalar.
#[derive(Debug, Clone, Copy)]
pub struct PriorityScorer<'cfg> {
    risk: RiskModel<'cfg>,
    weights: &'cfg ScoreWeights,
}

impl<'cfg> PriorityScorer<'cfg> {
    /// Create a scorer from a risk model and weight table.
    #[must_use]
    pub const fn new(risk: RiskModel<'cfg>, weights: &'cfg ScoreWeights) -> Self {
        Self { risk, weights }
    }

    /// Priority score in `0.0..=100.0`, one decimal.
    #[must_use]
    pub fn score(&self, bin: &Bin) -> f64 {
        self.score_with(bin, &self.risk.predict(bin))
    }

    /// Score the bin and attach every derived value.
    #[must_use]
    pub fn assess(&self, bin: &Bin) -> ScoredBin {
        let risk = self.risk.predict(bin);
        ScoredBin {
            bin: bin.clone(),
            overflow_probability: risk.probability,
            hours_to_critical: risk.hours_to_critical,
            priority: self.score_with(bin, &risk),
        }
    }

    fn score_with(&self, bin: &Bin, risk: &OverflowRisk) -> f64 {
        let persona_weight = self.risk.multiplier(bin) / 2.0;
        let raw = self.weights.fill * bin.fill_level.ratio()
            + self.weights.probability * risk.probability
            + self.weights.persona * persona_weight;

        round_to_tenth(raw * 100.0).clamp(0.0, 100.0)
    }
}

/// Round to one decimal on the exact binary value, so `0.35` (stored as
/// `0.34999...`) gives `0.3`. Exact ties go to even.
fn round_to_tenth(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}
