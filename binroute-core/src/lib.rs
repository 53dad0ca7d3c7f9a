//! Core types and the optimisation pipeline for the binroute collection planner.

/// Spatial partitioning of selected bins across the vehicle fleet.
pub mod cluster;
/// Immutable configuration tables shared by all pipeline stages.
pub mod config;
/// Non-authoritative feedback reporting.
pub mod feedback;
/// Domain models for bins, depots, stops, and routes.
pub mod model;
/// Traits describing the road-geometry provider interface.
pub mod ports;
/// 2-opt refinement and the route cost model.
pub mod refine;
/// Overflow risk estimation and priority scoring.
pub mod risk;
/// Leg-by-leg road path expansion with straight-line fallback.
pub mod road;
/// Pickup selection policies.
pub mod selection;
/// Nearest-neighbour tour construction.
pub mod sequence;
/// High-level planner facade used by clients.
pub mod service;

pub use cluster::*;
pub use config::*;
pub use feedback::*;
pub use model::*;
pub use ports::*;
pub use refine::*;
pub use risk::*;
pub use road::*;
pub use selection::*;
pub use sequence::*;
pub use service::*;
