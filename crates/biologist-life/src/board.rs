//! Bounded board and the step function.
//!
//! Cells outside `0..width` x `0..height` are permanently dead; there is no
//! wrap-around. Only living cells and their neighbours are visited, so a
//! step costs time proportional to the population, not the board area.

use std::collections::{BTreeMap, BTreeSet};

use biologist_types::{Coordinate, Generation};

use crate::error::LifeError;
use crate::rules::RuleSet;

/// Relative positions of the eight neighbours.
const NEIGHBOURHOOD: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Board size in cells. Both sides are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Validate and build board dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidDimensions`] if either side is zero.
    pub const fn new(width: u32, height: u32) -> Result<Self, LifeError> {
        if width == 0 || height == 0 {
            return Err(LifeError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in cells.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether `cell` lies on the board.
    pub fn contains(&self, cell: Coordinate) -> bool {
        (0..i64::from(self.width)).contains(&cell.x)
            && (0..i64::from(self.height)).contains(&cell.y)
    }

    /// Total number of cells.
    pub fn area(&self) -> u64 {
        u64::from(self.width).saturating_mul(u64::from(self.height))
    }

    /// Every cell on the board in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> {
        let width = i64::from(self.width);
        (0..i64::from(self.height))
            .flat_map(move |y| (0..width).map(move |x| Coordinate::new(x, y)))
    }

    pub(crate) const fn out_of_bounds(self, cell: Coordinate) -> LifeError {
        LifeError::CellOutOfBounds {
            x: cell.x,
            y: cell.y,
            width: self.width,
            height: self.height,
        }
    }
}

impl core::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A bounded life-like board at a given generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    dimensions: Dimensions,
    rules: RuleSet,
    living: BTreeSet<Coordinate>,
    sequence: u64,
}

impl Board {
    /// Build generation 0 from seed cells.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::CellOutOfBounds`] if a seed cell is off the
    /// board.
    pub fn new(
        dimensions: Dimensions,
        rules: RuleSet,
        seed: impl IntoIterator<Item = Coordinate>,
    ) -> Result<Self, LifeError> {
        let mut living = BTreeSet::new();
        for cell in seed {
            if !dimensions.contains(cell) {
                return Err(dimensions.out_of_bounds(cell));
            }
            living.insert(cell);
        }
        Ok(Self {
            dimensions,
            rules,
            living,
            sequence: 0,
        })
    }

    /// Advance one generation and return it.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::GenerationOverflow`] once the sequence counter
    /// is exhausted; the board is left unchanged.
    pub fn step(&mut self) -> Result<Generation, LifeError> {
        let sequence = self
            .sequence
            .checked_add(1)
            .ok_or(LifeError::GenerationOverflow {
                sequence: self.sequence,
            })?;

        let mut neighbours: BTreeMap<Coordinate, u8> =
            self.living.iter().map(|cell| (*cell, 0)).collect();
        for cell in &self.living {
            for (dx, dy) in NEIGHBOURHOOD {
                let (Some(x), Some(y)) = (cell.x.checked_add(dx), cell.y.checked_add(dy)) else {
                    continue;
                };
                let neighbour = Coordinate::new(x, y);
                if self.dimensions.contains(neighbour) {
                    let count = neighbours.entry(neighbour).or_insert(0);
                    *count = count.saturating_add(1);
                }
            }
        }

        self.living = neighbours
            .into_iter()
            .filter(|(cell, count)| self.rules.next_alive(*count, self.living.contains(cell)))
            .map(|(cell, _)| cell)
            .collect();
        self.sequence = sequence;
        Ok(self.snapshot())
    }

    /// The current generation.
    pub fn snapshot(&self) -> Generation {
        Generation::new(self.sequence, self.living.iter().copied())
    }

    /// Sequence number of the current generation.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Number of living cells.
    pub fn population(&self) -> usize {
        self.living.len()
    }

    /// Board size.
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Rules the board steps under.
    pub const fn rules(&self) -> RuleSet {
        self.rules
    }
}
