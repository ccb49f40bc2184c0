//! Configuration loading and typed config structures for the Biologist
//! analyzer.
//!
//! The configuration lives in `biologist.yaml`. Every field has a default,
//! so a missing file, a missing section, or a missing key all fall back to
//! values that analyze a 3x3 board of blinkers under Conway's rule.

use std::path::Path;

use serde::Deserialize;

use crate::store::DEFAULT_STORE_BUFFER;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BiologistConfig {
    /// Analysis engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Board the reference generation source steps.
    #[serde(default)]
    pub board: BoardConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BiologistConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Analysis engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the channel between the generation source and the
    /// analysis worker.
    #[serde(default = "default_update_buffer")]
    pub update_buffer: usize,

    /// Capacity of the analysis store's request channel.
    #[serde(default = "default_store_buffer")]
    pub store_buffer: usize,

    /// How long the binary waits for the board to settle before stopping
    /// the engine (0 = wait forever).
    #[serde(default = "default_run_timeout_ms")]
    pub run_timeout_ms: u64,

    /// How many generations the binary reports after the run, including
    /// virtual ones past the stored prefix.
    #[serde(default = "default_report_generations")]
    pub report_generations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_buffer: default_update_buffer(),
            store_buffer: default_store_buffer(),
            run_timeout_ms: default_run_timeout_ms(),
            report_generations: default_report_generations(),
        }
    }
}

/// Board configuration for the reference generation source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardConfig {
    /// Board width in cells.
    #[serde(default = "default_board_side")]
    pub width: u32,

    /// Board height in cells.
    #[serde(default = "default_board_side")]
    pub height: u32,

    /// Seed pattern name (`blinkers`, `gliders`, `random`, `user`, ...).
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Birth/survival rule in `B3/S23` notation.
    #[serde(default = "default_rule")]
    pub rule: String,

    /// Milliseconds between generations (0 = as fast as the analyzer
    /// consumes them).
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Seed for the `random` pattern.
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Percentage of live cells for the `random` pattern.
    #[serde(default = "default_density_percent")]
    pub density_percent: u8,

    /// Explicit `[x, y]` cells for the `user` pattern.
    #[serde(default)]
    pub cells: Vec<[i64; 2]>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: default_board_side(),
            height: default_board_side(),
            pattern: default_pattern(),
            rule: default_rule(),
            tick_interval_ms: 0,
            random_seed: default_random_seed(),
            density_percent: default_density_percent(),
            cells: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde)
// ---------------------------------------------------------------------------

const fn default_update_buffer() -> usize {
    16
}

const fn default_store_buffer() -> usize {
    DEFAULT_STORE_BUFFER
}

const fn default_run_timeout_ms() -> u64 {
    10_000
}

const fn default_report_generations() -> usize {
    8
}

const fn default_board_side() -> u32 {
    3
}

fn default_pattern() -> String {
    "blinkers".to_owned()
}

fn default_rule() -> String {
    "B3/S23".to_owned()
}

const fn default_random_seed() -> u64 {
    42
}

const fn default_density_percent() -> u8 {
    35
}

fn default_log_level() -> String {
    "info".to_owned()
}
