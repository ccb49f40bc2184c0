//! Board fingerprints and first-repeat detection.
//!
//! The detector remembers the earliest sequence number at which each board
//! fingerprint was seen. The first time a fingerprint comes back, the board
//! has entered a cycle: every later generation repeats with period
//! `revealed_at - first_seen`. After that the detector is done and ignores
//! further observations.
//!
//! # Fingerprints
//!
//! A [`Fingerprint`] is a BLAKE3 digest over a canonical encoding of the
//! living set: coordinates sorted and deduplicated, prefixed with the cell
//! count, each cell written as fixed-width little-endian `x` then `y`. The
//! encoding is injective over full coordinates, so two boards that share a
//! column but differ in rows never collide by construction.

use std::collections::{BTreeSet, HashMap};

use biologist_types::{Coordinate, CycleInfo};
use tracing::{debug, info};

/// A fixed-size digest identifying one board state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint a living set. Input order and duplicates do not matter.
    pub fn of(living: &[Coordinate]) -> Self {
        let canonical: BTreeSet<&Coordinate> = living.iter().collect();
        let count = u64::try_from(canonical.len()).unwrap_or(u64::MAX);

        let mut hasher = blake3::Hasher::new();
        hasher.update(&count.to_le_bytes());
        for cell in canonical {
            hasher.update(&cell.x.to_le_bytes());
            hasher.update(&cell.y.to_le_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl core::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(self.as_bytes()))
    }
}

/// Recognizes the first generation whose board state occurred before.
#[derive(Debug, Default)]
pub struct StabilityDetector {
    /// Fingerprint -> earliest sequence number it was observed at.
    seen: HashMap<Fingerprint, u64>,
    /// Set exactly once, on the first repeat.
    cycle: Option<CycleInfo>,
}

impl StabilityDetector {
    /// Create a detector that has observed nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the board at `sequence` and report whether a cycle is known.
    ///
    /// Returns `true` when this board repeats an earlier one (or a cycle was
    /// already found), `false` while every board seen so far is unique.
    /// An empty living set is a valid board state.
    pub fn observe(&mut self, living: &[Coordinate], sequence: u64) -> bool {
        if self.cycle.is_some() {
            return true;
        }

        let fingerprint = Fingerprint::of(living);
        let Some(&first_seen) = self.seen.get(&fingerprint) else {
            debug!(sequence, %fingerprint, "New board state");
            self.seen.insert(fingerprint, sequence);
            return false;
        };
        let Some(cycle) = CycleInfo::between(first_seen, sequence) else {
            debug!(sequence, first_seen, "Board re-observed at or before its first sighting");
            return false;
        };
        info!(
            cycle_start = cycle.start,
            cycle_length = cycle.length,
            revealed_at = sequence,
            %fingerprint,
            "Cycle detected"
        );
        self.cycle = Some(cycle);
        self.seen.clear();
        true
    }

    /// The detected cycle, if any.
    pub const fn cycle(&self) -> Option<CycleInfo> {
        self.cycle
    }

    /// Whether a cycle has been detected.
    pub const fn is_detected(&self) -> bool {
        self.cycle.is_some()
    }

    /// Number of distinct board states remembered so far.
    pub fn distinct_states(&self) -> usize {
        self.seen.len()
    }
}
