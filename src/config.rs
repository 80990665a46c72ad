//! Parser Configuration
//!
//! Settings shared by the cell parser and the plan walker. Every field has
//! a default, so a YAML file only needs the keys it changes.
//!
//! # Example YAML Format
//!
//! ```yaml
//! indent_width: 2
//! default_workout_name: Workout
//! max_parallel: 4
//! max_depth: 64
//! ```

use std::error::Error;
use std::fs;

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Default spaces per nesting level.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

/// Deepest nesting level a cell may use.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Name given to workouts whose header has no name.
pub const DEFAULT_WORKOUT_NAME: &str = "Workout";

/// Configuration for parsing cells and walking plans.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    /// Spaces per nesting level (a tab always counts as one level)
    pub indent_width: usize,

    /// Name used when a header has an empty name
    pub default_workout_name: String,

    /// Worker threads for the parallel walker, 0 means one per CPU
    pub max_parallel: usize,

    /// Step and repeat lines at this depth or deeper are rejected
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            default_workout_name: DEFAULT_WORKOUT_NAME.to_string(),
            max_parallel: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, Box<dyn Error>> {
        let config: ParserConfig = serde_yaml::from_str(yaml)
            .map_err(|e| format!("Failed to parse parser config YAML: {}", e))?;

        if config.indent_width == 0 {
            return Err("indent_width must be at least 1".into());
        }
        if config.max_depth == 0 {
            return Err("max_depth must be at least 1".into());
        }

        Ok(config)
    }

    /// Number of worker threads to use for a parallel walk.
    pub fn parallelism(&self) -> usize {
        if self.max_parallel == 0 {
            num_cpus::get()
        } else {
            self.max_parallel
        }
    }
}

/// Loads a parser configuration from a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use planparse::config::load_config;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_config("planparse.yaml")?;
///     println!("indent width: {}", config.indent_width);
///     Ok(())
/// }
/// ```
pub fn load_config(path: &str) -> Result<ParserConfig, Box<dyn Error>> {
    info!("Loading parser config from: {}", path);

    let yaml_content = fs::read_to_string(path).map_err(|e| {
        format!(
            "Failed to read config file '{}': {}. Check that the file exists and is readable.",
            path, e
        )
    })?;

    debug!("Config content loaded ({} bytes)", yaml_content.len());

    ParserConfig::from_yaml_str(&yaml_content)
}
