//! Reference generation source for the Biologist analyzer.
//!
//! A bounded, life-like cellular automaton that plugs into the analysis
//! core through [`GenerationSource`]. It exists so the engine can be run
//! and tested against real boards; any other producer of generations can
//! take its place.
//!
//! # Modules
//!
//! - [`board`] -- [`Dimensions`] and the bounded [`Board`] step function.
//! - [`rules`] -- [`RuleSet`] parsing from `B3/S23` notation.
//! - [`pattern`] -- Seed [`Pattern`]s: tiled oscillators, still lifes,
//!   gliders, random fill, and user cells.
//! - [`source`] -- [`LifeSource`], stepping a board on a tokio task.
//! - [`error`] -- [`LifeError`].
//!
//! [`GenerationSource`]: biologist_core::GenerationSource

pub mod board;
pub mod error;
pub mod pattern;
pub mod rules;
pub mod source;

// Re-export primary types at crate root.
pub use board::{Board, Dimensions};
pub use error::LifeError;
pub use pattern::Pattern;
pub use rules::RuleSet;
pub use source::LifeSource;
