//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, the analysis run, and reporting.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: biologist_core::ConfigError,
    },

    /// The life board could not be built.
    #[error("life error: {source}")]
    Life {
        /// The underlying board error.
        #[from]
        source: biologist_life::LifeError,
    },

    /// The analysis engine failed to initialize or start.
    #[error("analysis error: {source}")]
    Analysis {
        /// The underlying engine error.
        #[from]
        source: biologist_core::EngineError,
    },

    /// A report query failed.
    #[error("query error: {source}")]
    Query {
        /// The underlying query error.
        #[from]
        source: biologist_core::QueryError,
    },

    /// The analysis store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: biologist_core::StoreError,
    },

    /// An analysis could not be serialized for the report.
    #[error("serialization error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
