//! Enumeration types for generation analysis.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a generation.
///
/// An engine moves `Seeded -> Active -> {Stable | Dead}`. `Active` may hold
/// for any number of generations before the board settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The seed generation before any transition has been observed.
    Seeded,
    /// Living cells exist and no repeat has been recognized yet.
    Active,
    /// The board state is a repeat of an earlier generation.
    Stable,
    /// No living cells remain.
    Dead,
}

impl Status {
    /// Classify a living set before stability is considered.
    ///
    /// Returns [`Status::Dead`] for an empty board and [`Status::Active`]
    /// otherwise.
    pub const fn from_population(living: usize) -> Self {
        if living == 0 { Self::Dead } else { Self::Active }
    }

    /// Whether an engine should keep requesting generations after a
    /// generation with this status.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Seeded => "Seeded",
            Self::Active => "Active",
            Self::Stable => "Stable",
            Self::Dead => "Dead",
        };
        f.write_str(label)
    }
}

/// How a cell changed between two consecutive generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// The cell is alive now and was not before.
    Born,
    /// The cell was alive before and is not now.
    Died,
}

impl core::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Born => f.write_str("Born"),
            Self::Died => f.write_str("Died"),
        }
    }
}
