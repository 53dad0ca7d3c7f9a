//! Human-readable plan summary.

use std::io::{self, Write};

use binroute_core::{RoutePlan, Stop};

pub fn write_summary<W: Write>(out: &mut W, plan: &RoutePlan) -> io::Result<()> {
    writeln!(
        out,
        "Plan for {}: {} route(s) for {} requested vehicle(s)",
        plan.date,
        plan.routes.len(),
        plan.requested_vehicles
    )?;

    if plan.routes.is_empty() {
        writeln!(out, "No bins need collection.")?;
    }

    for route in &plan.routes {
        writeln!(
            out,
            "Route {}: {} pickup(s), cost {:.4}, {} path point(s)",
            route.vehicle + 1,
            route.bin_count(),
            route.cost,
            route.path.len()
        )?;
        for stop in &route.stops {
            match stop {
                Stop::Depot { name, .. } => writeln!(out, "  -> {name}")?,
                Stop::Bin {
                    id,
                    fill_level,
                    persona,
                    priority,
                    ..
                } => writeln!(
                    out,
                    "  -> {id} ({persona}, fill {:.0}%, priority {priority:.1})",
                    fill_level.percent()
                )?,
            }
        }
    }

    if let Some(feedback) = &plan.feedback {
        writeln!(out, "{feedback}")?;
    }

    Ok(())
}
