//! Command line front end for binroute: reads a bin snapshot and prints collection routes.

mod args;
mod report;
mod settings;
mod snapshot;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use binroute_core::{OptimizeRequest, RoadGeometryPort, RoutePlanner, StraightLinePort};
use binroute_provider_osrm as osrm;
use chrono::Local;
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::{Options, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::from_matches(&args::cli().get_matches());
    init_logging(options.json_logs);

    let config = settings::load(options.config.as_deref()).context("loading settings")?;
    let bins = snapshot::load(&options.snapshot)?;

    // Road geometry backend
    let port: Arc<dyn RoadGeometryPort> = if options.offline {
        Arc::new(StraightLinePort)
    } else {
        let client = Client::builder().user_agent("binroute/0.1").build()?;
        osrm::port(client, &config.routing)
    };

    let planner = RoutePlanner::new(config, port);
    let request = OptimizeRequest {
        date: options.date.unwrap_or_else(|| Local::now().date_naive()),
        vehicle_count: options.vehicles,
        depot: options.depot.clone(),
    };

    info!(
        bins = bins.len(),
        vehicles = request.vehicle_count.get(),
        offline = options.offline,
        "planning routes"
    );
    let plan = planner
        .optimize(&bins, &request)
        .await
        .context("planning routes")?;

    // stdout carries only the plan, logs go to stderr
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match options.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &plan)?;
            writeln!(out)?;
        }
        OutputFormat::Summary => report::write_summary(&mut out, &plan)?,
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
