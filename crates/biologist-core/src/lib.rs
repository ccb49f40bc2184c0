//! Change detection, stability detection, and analysis orchestration for the
//! Biologist generation analyzer.
//!
//! A [`Biologist`] consumes generations from a [`GenerationSource`] one at a
//! time, diffs each against its predecessor, and watches for the first board
//! state that repeats. Once a repeat is found the engine stops stepping and
//! answers queries for any later generation by remapping into the cycle.
//!
//! # Modules
//!
//! - [`changes`] -- Born/died diff between two living sets.
//! - [`stability`] -- Board fingerprints and first-repeat detection.
//! - [`store`] -- Append-only analysis store owned by a single worker task.
//! - [`analyzer`] -- Per-generation classification feeding the store.
//! - [`biologist`] -- The engine handle: initialize, start, stop, query.
//! - [`source`] -- [`GenerationSource`] trait, [`StopHandle`], and
//!   [`ReplaySource`].
//! - [`registry`] -- Injected mapping from [`BiologistId`] to engines.
//! - [`config`] -- Configuration loading from `biologist.yaml`.
//!
//! [`Biologist`]: biologist::Biologist
//! [`GenerationSource`]: source::GenerationSource
//! [`StopHandle`]: source::StopHandle
//! [`ReplaySource`]: source::ReplaySource
//! [`BiologistId`]: biologist_types::BiologistId

pub mod analyzer;
pub mod biologist;
pub mod changes;
pub mod config;
pub mod registry;
pub mod source;
pub mod stability;
pub mod store;

// Re-export primary types at crate root.
pub use analyzer::{Analyzer, EngineError};
pub use biologist::{Biologist, QueryError, WorkerExit};
pub use config::{BiologistConfig, ConfigError};
pub use registry::{Registry, RegistryError};
pub use source::{GenerationSource, ReplaySource, StopHandle};
pub use stability::{Fingerprint, StabilityDetector};
pub use store::{AnalysisStore, StoreError};
