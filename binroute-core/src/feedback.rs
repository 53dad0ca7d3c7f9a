//! Non-authoritative feedback reporting.
//!
//! The report quotes a simulated error rate drawn from the configured range. It is
//! telemetry for operators only: no risk, scoring, or selection parameter is read
//! back from it or changed by it.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::config::FeedbackConfig;
use crate::model::PlannedRoute;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Side-channel status attached to a route plan.
pub struct FeedbackReport {
    /// Simulated error rate, as a fraction.
    pub error_rate: f64,
    /// Routes covered by the report.
    pub routes: usize,
    /// Bins visited across all routes.
    pub stops: usize,
    /// Human-readable status line.
    pub message: String,
}

impl fmt::Display for FeedbackReport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

/// Produces [`FeedbackReport`]s from an injected randomness source.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackReporter {
    min_error_rate: f64,
    max_error_rate: f64,
}

impl FeedbackReporter {
    /// Create a reporter for the configured error-rate range.
    #[must_use]
    pub fn new(config: &FeedbackConfig) -> Self {
        let (min_error_rate, max_error_rate) = if config.min_error_rate <= config.max_error_rate {
            (config.min_error_rate, config.max_error_rate)
        } else {
            (config.max_error_rate, config.min_error_rate)
        };
        Self {
            min_error_rate,
            max_error_rate,
        }
    }

    /// Summarise `routes`. Pure apart from drawing from `rng`.
    pub fn report<R: Rng>(&self, routes: &[PlannedRoute], rng: &mut R) -> FeedbackReport {
        let error_rate = rng.gen_range(self.min_error_rate..=self.max_error_rate);
        let stops = routes.iter().map(PlannedRoute::bin_count).sum();
        let message = format!(
            "[feedback] simulated error rate {:.1}% over {} route(s), {stops} pickup(s); \
             no model parameters were changed",
            error_rate * 100.0,
            routes.len(),
        );

        FeedbackReport {
            error_rate,
            routes: routes.len(),
            stops,
            message,
        }
    }
}

impl Default for FeedbackReporter {
    fn default() -> Self {
        Self::new(&FeedbackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::model::Depot;

    fn route() -> PlannedRoute {
        let depot = Depot::default();
        PlannedRoute {
            vehicle: 0,
            stops: vec![depot.stop(), depot.stop()],
            cost: 0.0,
            path: Vec::new(),
        }
    }

    #[test]
    fn error_rate_stays_in_range() {
        let reporter = FeedbackReporter::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let report = reporter.report(&[route()], &mut rng);
            assert!((0.02..=0.05).contains(&report.error_rate));
            assert_eq!(report.routes, 1);
            assert_eq!(report.stops, 0);
        }
    }

    #[test]
    fn seeded_reports_are_reproducible() {
        let reporter = FeedbackReporter::default();
        let routes = [route(), route()];

        let first = reporter.report(&routes, &mut StdRng::seed_from_u64(11));
        let second = reporter.report(&routes, &mut StdRng::seed_from_u64(11));

        assert_eq!(first, second);
        assert!(first.to_string().contains("2 route(s)"));
    }

    #[test]
    fn inverted_range_is_normalised() {
        let reporter = FeedbackReporter::new(&FeedbackConfig {
            min_error_rate: 0.4,
            max_error_rate: 0.1,
        });

        let report = reporter.report(&[], &mut StdRng::seed_from_u64(3));
        assert!((0.1..=0.4).contains(&report.error_rate));
    }
}
