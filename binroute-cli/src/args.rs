//! Command line definition and the options extracted from it.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use binroute_core::{Depot, GeoPoint};
use chrono::NaiveDate;
use clap::{Arg, ArgAction, ArgMatches, Command, arg, value_parser};

/// How the finished plan is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Summary,
}

/// Everything the run needs from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub snapshot: PathBuf,
    pub vehicles: NonZeroUsize,
    pub date: Option<NaiveDate>,
    pub config: Option<PathBuf>,
    pub offline: bool,
    pub depot: Option<Depot>,
    pub format: OutputFormat,
    pub json_logs: bool,
}

pub fn cli() -> Command {
    Command::new("binroute")
        .about("Plans waste collection routes from a bin fill-level snapshot")
        .arg(
            arg!(--snapshot <PATH> "Bin snapshot JSON file (array of bin records)")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--vehicles [N] "Number of collection vehicles")
                .default_value("3")
                .value_parser(value_parser!(NonZeroUsize)),
        )
        .arg(
            arg!(--date [DATE] "Service date echoed into the plan (YYYY-MM-DD), defaults to today")
                .value_parser(value_parser!(NaiveDate)),
        )
        .arg(
            arg!(--config [PATH] "Settings file (toml, json or yaml)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(--offline "Use straight legs instead of querying the routing service"))
        .arg(
            Arg::new("depot-lat")
                .long("depot-lat")
                .value_name("LAT")
                .help("Depot latitude for this run")
                .value_parser(value_parser!(f64))
                .requires("depot-lon"),
        )
        .arg(
            Arg::new("depot-lon")
                .long("depot-lon")
                .value_name("LON")
                .help("Depot longitude for this run")
                .value_parser(value_parser!(f64))
                .requires("depot-lat"),
        )
        .arg(
            Arg::new("depot-id")
                .long("depot-id")
                .value_name("ID")
                .help("Depot identifier used with --depot-lat/--depot-lon")
                .requires("depot-lat"),
        )
        .arg(
            arg!(--format [FORMAT] "Output format")
                .value_parser(["summary", "json"])
                .default_value("summary"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Emit log lines as JSON on stderr")
                .action(ArgAction::SetTrue),
        )
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let depot = match (
            matches.get_one::<f64>("depot-lat"),
            matches.get_one::<f64>("depot-lon"),
        ) {
            (Some(&lat), Some(&lon)) => {
                let id = matches
                    .get_one::<String>("depot-id")
                    .cloned()
                    .unwrap_or_else(|| "DEPOT".to_owned());
                Some(Depot {
                    name: id.clone(),
                    id,
                    location: GeoPoint::new(lat, lon),
                })
            }
            _ => None,
        };

        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Summary,
        };

        Self {
            // required and defaulted args are always present
            snapshot: matches.get_one::<PathBuf>("snapshot").cloned().unwrap_or_default(),
            vehicles: matches
                .get_one::<NonZeroUsize>("vehicles")
                .copied()
                .unwrap_or(NonZeroUsize::MIN),
            date: matches.get_one::<NaiveDate>("date").copied(),
            config: matches.get_one::<PathBuf>("config").cloned(),
            offline: matches.get_flag("offline"),
            depot,
            format,
            json_logs: matches.get_flag("json-logs"),
        }
    }
}
