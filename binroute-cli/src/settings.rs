//! Layered planner settings: defaults, then an optional file, then the environment.

use std::path::Path;

use binroute_core::PlannerConfig;
use config::{Config, ConfigError, Environment, File};

/// Environment variables look like `BINROUTE__ROUTING__TIMEOUT_MS=500`.
pub const ENV_PREFIX: &str = "BINROUTE";
const ENV_SEPARATOR: &str = "__";

/// Load settings. The file format follows its extension.
pub fn load(path: Option<&Path>) -> Result<PlannerConfig, ConfigError> {
    layered(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

fn layered(path: Option<&Path>, env: Environment) -> Result<PlannerConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }

    builder.add_source(env).build()?.try_deserialize()
}
