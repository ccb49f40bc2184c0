//! Shared type definitions for the Biologist generation analyzer.
//!
//! This crate is the single source of truth for the data model shared by the
//! analysis core, the generation sources that feed it, and whatever transport
//! layer serves analyses to clients. Every type derives `serde` traits so the
//! transport can pick its own wire format.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper identifying analysis engine instances
//! - [`enums`] -- [`Status`] and [`ChangeKind`]
//! - [`structs`] -- Coordinates, generations, analyses, and cycle metadata

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ChangeKind, Status};
pub use ids::BiologistId;
pub use structs::{Analysis, ChangedCell, Coordinate, CycleInfo, Generation};
