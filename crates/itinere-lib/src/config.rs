use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ports::PORT_SEARCH_RADIUS_KM;
use crate::spatial::DEFAULT_CELL_SIZE;

/// Default input file name, resolved against the working directory.
pub const DEFAULT_INPUT_FILENAME: &str = "roman_roads.ndjson";

/// Default artifact file name, resolved against the working directory.
pub const DEFAULT_OUTPUT_FILENAME: &str = "itinere_graph.json";

/// Environment variable overriding the input path.
pub const INPUT_ENV_VAR: &str = "ITINERE_INPUT";

/// Environment variable overriding the artifact path.
pub const OUTPUT_ENV_VAR: &str = "ITINERE_OUTPUT";

/// Tunables for a single graph build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Spatial grid cell size in degrees.
    pub cell_size: f64,
    /// Port search radius in kilometres.
    pub port_radius_km: f64,
    /// Run the sea/land bridging stage.
    pub bridge_ports: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            port_radius_km: PORT_SEARCH_RADIUS_KM,
            bridge_ports: true,
        }
    }
}

impl BuildConfig {
    /// Reject values that would produce a meaningless grid or search.
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(Error::InvalidConfig {
                message: format!("cell size must be a positive number, got {}", self.cell_size),
            });
        }
        if !self.port_radius_km.is_finite() || self.port_radius_km <= 0.0 {
            return Err(Error::InvalidConfig {
                message: format!(
                    "port radius must be a positive number of kilometres, got {}",
                    self.port_radius_km
                ),
            });
        }
        Ok(())
    }
}

/// Resolve the feature input path.
///
/// The resolution order is:
/// 1. Explicit `explicit` argument when provided.
/// 2. `ITINERE_INPUT` environment variable.
/// 3. `roman_roads.ndjson` in the working directory.
pub fn resolve_input_path(explicit: Option<&Path>) -> PathBuf {
    resolve_path(explicit, env::var_os(INPUT_ENV_VAR), DEFAULT_INPUT_FILENAME)
}

/// Resolve the artifact output path, using `ITINERE_OUTPUT` and then
/// `itinere_graph.json` as fallbacks.
pub fn resolve_output_path(explicit: Option<&Path>) -> PathBuf {
    resolve_path(explicit, env::var_os(OUTPUT_ENV_VAR), DEFAULT_OUTPUT_FILENAME)
}

fn resolve_path(explicit: Option<&Path>, from_env: Option<OsString>, default: &str) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    match from_env {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_constants() {
        let config = BuildConfig::default();
        assert_eq!(config.cell_size, 0.25);
        assert_eq!(config.port_radius_km, 20.0);
        assert!(config.bridge_ports);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_positive_values() {
        let config = BuildConfig {
            cell_size: 0.0,
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

        let config = BuildConfig {
            port_radius_km: f64::NAN,
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn explicit_path_beats_environment() {
        let resolved = resolve_path(
            Some(Path::new("explicit.ndjson")),
            Some(OsString::from("env.ndjson")),
            DEFAULT_INPUT_FILENAME,
        );
        assert_eq!(resolved, PathBuf::from("explicit.ndjson"));
    }

    #[test]
    fn environment_beats_default_unless_empty() {
        let resolved = resolve_path(None, Some(OsString::from("env.ndjson")), "default.ndjson");
        assert_eq!(resolved, PathBuf::from("env.ndjson"));

        let resolved = resolve_path(None, Some(OsString::new()), "default.ndjson");
        assert_eq!(resolved, PathBuf::from("default.ndjson"));

        let resolved = resolve_path(None, None, "default.ndjson");
        assert_eq!(resolved, PathBuf::from("default.ndjson"));
    }
}
