//! Core data structs: coordinates, generations, analyses, and cycles.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::enums::{ChangeKind, Status};

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A cell position on the board. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl Coordinate {
    /// Create a coordinate from its column and row.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i64, i64)> for Coordinate {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// One discrete timestep produced by a generation source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Position in the stream; the seed is 0 and each step adds 1.
    pub sequence: u64,
    /// Living cells in source iteration order, without duplicates.
    pub living: Vec<Coordinate>,
}

impl Generation {
    /// Build a generation, dropping repeated coordinates.
    ///
    /// The first occurrence of each coordinate keeps its position so the
    /// source's iteration order is preserved.
    pub fn new(sequence: u64, living: impl IntoIterator<Item = Coordinate>) -> Self {
        let mut seen = BTreeSet::new();
        let living = living.into_iter().filter(|cell| seen.insert(*cell)).collect();
        Self { sequence, living }
    }

    /// The seed generation (sequence 0).
    pub fn seed(living: impl IntoIterator<Item = Coordinate>) -> Self {
        Self::new(0, living)
    }

    /// Whether no cell is alive.
    pub const fn is_empty(&self) -> bool {
        self.living.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Changes
// ---------------------------------------------------------------------------

/// A cell whose state differs from the previous generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangedCell {
    /// Where the change happened.
    pub coordinate: Coordinate,
    /// Whether the cell was born or died.
    pub kind: ChangeKind,
}

impl ChangedCell {
    /// A cell that came alive.
    pub const fn born(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            kind: ChangeKind::Born,
        }
    }

    /// A cell that died.
    pub const fn died(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            kind: ChangeKind::Died,
        }
    }
}

impl core::fmt::Display for ChangedCell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{{{}, {}}}", self.kind, self.coordinate)
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// The computed record for one generation.
///
/// Stored analyses are immutable. Queries past the stored prefix return a
/// copy of a cycle representative with only the status replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Lifecycle status of the generation.
    pub status: Status,
    /// Living cells, in the order the source produced them.
    pub living: Vec<Coordinate>,
    /// Born cells first, then died cells.
    pub changes: Vec<ChangedCell>,
}

impl Analysis {
    /// Copy this analysis as the answer for a generation inside a cycle.
    ///
    /// The status becomes [`Status::Stable`], except that an empty board
    /// stays [`Status::Dead`].
    #[must_use]
    pub fn as_cycle_repeat(&self) -> Self {
        let status = if self.living.is_empty() {
            Status::Dead
        } else {
            Status::Stable
        };
        Self {
            status,
            living: self.living.clone(),
            changes: self.changes.clone(),
        }
    }
}

impl core::fmt::Display for Analysis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Analysis {{")?;
        writeln!(f, "\tStatus = {}", self.status)?;
        writeln!(f, "\tLiving = {{")?;
        for cell in &self.living {
            writeln!(f, "\t\t{cell}")?;
        }
        writeln!(f, "\t}}")?;
        writeln!(f, "\tChanged = {{")?;
        for change in &self.changes {
            writeln!(f, "\t\t{change}")?;
        }
        writeln!(f, "\t}}")?;
        write!(f, "}}")
    }
}

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// A detected repeat: the board at `start + length` equals the board at
/// `start`, so every later generation repeats with period `length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleInfo {
    /// Earliest sequence number of the repeated board state.
    pub start: u64,
    /// Period of the cycle, always at least 1.
    pub length: u64,
}

impl CycleInfo {
    /// Build cycle metadata from the first occurrence of a board state and
    /// the sequence number at which it reappeared.
    ///
    /// Returns `None` unless `revealed_at > start`.
    pub fn between(start: u64, revealed_at: u64) -> Option<Self> {
        let length = revealed_at.checked_sub(start).filter(|len| *len > 0)?;
        Some(Self { start, length })
    }

    /// The sequence number that revealed the repeat.
    pub const fn revealed_at(&self) -> u64 {
        self.start.saturating_add(self.length)
    }

    /// Map any generation onto its representative inside the stored prefix.
    ///
    /// Generations before `start` map to themselves; later ones map to
    /// `start + (generation - start) % length`.
    pub fn remap(&self, generation: u64) -> u64 {
        generation.checked_sub(self.start).map_or(generation, |offset| {
            let phase = offset.checked_rem(self.length).unwrap_or(0);
            self.start.saturating_add(phase)
        })
    }
}

impl core::fmt::Display for CycleInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "cycle(start={}, length={})", self.start, self.length)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn generation_drops_duplicates_in_order() {
        let generation = Generation::new(
            4,
            [
                Coordinate::new(2, 1),
                Coordinate::new(0, 0),
                Coordinate::new(2, 1),
                Coordinate::new(1, 1),
            ],
        );
        assert_eq!(
            generation.living,
            vec![Coordinate::new(2, 1), Coordinate::new(0, 0), Coordinate::new(1, 1)]
        );
    }

    #[test]
    fn cycle_requires_positive_length() {
        assert!(CycleInfo::between(3, 3).is_none());
        assert!(CycleInfo::between(4, 3).is_none());
        let cycle = CycleInfo::between(0, 2).unwrap();
        assert_eq!(cycle.length, 2);
        assert_eq!(cycle.revealed_at(), 2);
    }

    #[test]
    fn remap_matches_blinker_example() {
        let cycle = CycleInfo::between(0, 2).unwrap();
        assert_eq!(cycle.remap(5), 1);
        assert_eq!(cycle.remap(4), 0);
        assert_eq!(cycle.remap(2), 0);
    }

    #[test]
    fn remap_leaves_prefix_untouched() {
        let cycle = CycleInfo::between(5, 8).unwrap();
        assert_eq!(cycle.remap(2), 2);
        assert_eq!(cycle.remap(8), 5);
        assert_eq!(cycle.remap(10), 7);
    }

    #[test]
    fn cycle_repeat_overrides_status_only() {
        let analysis = Analysis {
            status: Status::Active,
            living: vec![Coordinate::new(1, 1)],
            changes: vec![ChangedCell::born(Coordinate::new(1, 1))],
        };
        let repeat = analysis.as_cycle_repeat();
        assert_eq!(repeat.status, Status::Stable);
        assert_eq!(repeat.living, analysis.living);
        assert_eq!(repeat.changes, analysis.changes);
        assert_eq!(analysis.status, Status::Active);
    }

    #[test]
    fn empty_cycle_repeat_stays_dead() {
        let analysis = Analysis {
            status: Status::Dead,
            living: Vec::new(),
            changes: Vec::new(),
        };
        assert_eq!(analysis.as_cycle_repeat().status, Status::Dead);
    }

    #[test]
    fn analysis_display_lists_cells() {
        let analysis = Analysis {
            status: Status::Active,
            living: vec![Coordinate::new(3, 4)],
            changes: vec![ChangedCell::died(Coordinate::new(5, 6))],
        };
        let text = analysis.to_string();
        assert!(text.contains("Status = Active"));
        assert!(text.contains("(3, 4)"));
        assert!(text.contains("{Died, (5, 6)}"));
    }

    proptest! {
        #[test]
        fn remap_lands_inside_one_period(
            start in 0u64..1_000,
            length in 1u64..64,
            generation in 0u64..100_000,
        ) {
            let cycle = CycleInfo { start, length };
            let mapped = cycle.remap(generation);
            if generation >= start {
                prop_assert!(mapped >= start);
                prop_assert!(mapped < start + length);
                prop_assert_eq!((generation - start) % length, mapped - start);
            } else {
                prop_assert_eq!(mapped, generation);
            }
        }
    }
}
