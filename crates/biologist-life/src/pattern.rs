//! Seed patterns.
//!
//! Most patterns are a small tile repeated across the board left to right,
//! top to bottom, with two empty cells between tiles so neighbouring tiles
//! never interact. A board too small for a single tile is rejected rather
//! than silently seeded empty.

use std::str::FromStr;

use biologist_core::config::BoardConfig;
use biologist_types::Coordinate;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::Dimensions;
use crate::error::LifeError;

/// Default live-cell percentage for [`Pattern::Random`].
pub const DEFAULT_DENSITY_PERCENT: u8 = 35;

/// Default RNG seed for [`Pattern::Random`].
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Empty cells between neighbouring tiles.
const TILE_MARGIN: u32 = 2;

/// A repeatable shape: its bounding box and live cells within it.
struct Tile {
    width: u32,
    height: u32,
    cells: &'static [(i64, i64)],
}

const BLINKER: Tile = Tile {
    width: 3,
    height: 3,
    cells: &[(1, 0), (1, 1), (1, 2)],
};

const TOAD: Tile = Tile {
    width: 4,
    height: 4,
    cells: &[(1, 1), (2, 1), (3, 1), (0, 2), (1, 2), (2, 2)],
};

const BEACON: Tile = Tile {
    width: 4,
    height: 4,
    cells: &[(0, 0), (1, 0), (0, 1), (3, 2), (2, 3), (3, 3)],
};

#[rustfmt::skip]
const PULSAR: Tile = Tile {
    width: 15,
    height: 15,
    cells: &[
        (3, 1), (4, 1), (5, 1), (9, 1), (10, 1), (11, 1),
        (1, 3), (6, 3), (8, 3), (13, 3),
        (1, 4), (6, 4), (8, 4), (13, 4),
        (1, 5), (6, 5), (8, 5), (13, 5),
        (3, 6), (4, 6), (5, 6), (9, 6), (10, 6), (11, 6),
        (3, 8), (4, 8), (5, 8), (9, 8), (10, 8), (11, 8),
        (1, 9), (6, 9), (8, 9), (13, 9),
        (1, 10), (6, 10), (8, 10), (13, 10),
        (1, 11), (6, 11), (8, 11), (13, 11),
        (3, 13), (4, 13), (5, 13), (9, 13), (10, 13), (11, 13),
    ],
};

const GLIDER: Tile = Tile {
    width: 3,
    height: 3,
    cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
};

const BLOCK: Tile = Tile {
    width: 2,
    height: 2,
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

const BEEHIVE: Tile = Tile {
    width: 4,
    height: 3,
    cells: &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (2, 2)],
};

const LOAF: Tile = Tile {
    width: 4,
    height: 4,
    cells: &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (3, 2), (2, 3)],
};

const BOAT: Tile = Tile {
    width: 3,
    height: 3,
    cells: &[(0, 0), (1, 0), (0, 1), (2, 1), (1, 2)],
};

/// How generation 0 is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Period-2 blinkers.
    Blinkers,
    /// Period-2 toads.
    Toads,
    /// Period-2 beacons.
    Beacons,
    /// Period-3 pulsars.
    Pulsars,
    /// Gliders heading towards the bottom-right corner.
    Gliders,
    /// Still-life blocks.
    Blocks,
    /// Still-life beehives.
    Beehives,
    /// Still-life loaves.
    Loaves,
    /// Still-life boats.
    Boats,
    /// A single cell in the centre of the board.
    Single,
    /// Each cell alive with the given probability, reproducibly.
    Random {
        /// RNG seed.
        seed: u64,
        /// Percentage of cells alive, `0..=100`.
        density_percent: u8,
    },
    /// An explicit list of cells.
    User(Vec<Coordinate>),
}

impl Pattern {
    /// Build the pattern a board config asks for.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::UnknownPattern`] for an unrecognized name.
    pub fn from_config(config: &BoardConfig) -> Result<Self, LifeError> {
        Ok(match config.pattern.parse::<Self>()? {
            Self::Random { .. } => Self::Random {
                seed: config.random_seed,
                density_percent: config.density_percent,
            },
            Self::User(_) => Self::User(
                config
                    .cells
                    .iter()
                    .map(|[x, y]| Coordinate::new(*x, *y))
                    .collect(),
            ),
            other => other,
        })
    }

    /// Canonical lower-case name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Blinkers => "blinkers",
            Self::Toads => "toads",
            Self::Beacons => "beacons",
            Self::Pulsars => "pulsars",
            Self::Gliders => "gliders",
            Self::Blocks => "blocks",
            Self::Beehives => "beehives",
            Self::Loaves => "loaves",
            Self::Boats => "boats",
            Self::Single => "single",
            Self::Random { .. } => "random",
            Self::User(_) => "user",
        }
    }

    /// Lay the pattern out on a board of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::PatternTooLarge`] if a tile does not fit,
    /// [`LifeError::InvalidDensity`] for a density above 100, or
    /// [`LifeError::CellOutOfBounds`] for a user cell off the board.
    pub fn seed(&self, dimensions: Dimensions) -> Result<Vec<Coordinate>, LifeError> {
        match self {
            Self::Blinkers => self.tiled(&BLINKER, dimensions),
            Self::Toads => self.tiled(&TOAD, dimensions),
            Self::Beacons => self.tiled(&BEACON, dimensions),
            Self::Pulsars => self.tiled(&PULSAR, dimensions),
            Self::Gliders => self.tiled(&GLIDER, dimensions),
            Self::Blocks => self.tiled(&BLOCK, dimensions),
            Self::Beehives => self.tiled(&BEEHIVE, dimensions),
            Self::Loaves => self.tiled(&LOAF, dimensions),
            Self::Boats => self.tiled(&BOAT, dimensions),
            Self::Single => Ok(vec![Coordinate::new(
                i64::from(dimensions.width() / 2),
                i64::from(dimensions.height() / 2),
            )]),
            Self::Random {
                seed,
                density_percent,
            } => random(dimensions, *seed, *density_percent),
            Self::User(cells) => {
                if let Some(outside) = cells.iter().find(|cell| !dimensions.contains(**cell)) {
                    return Err(dimensions.out_of_bounds(*outside));
                }
                Ok(cells.clone())
            }
        }
    }

    fn tiled(&self, tile: &Tile, dimensions: Dimensions) -> Result<Vec<Coordinate>, LifeError> {
        if tile.width > dimensions.width() || tile.height > dimensions.height() {
            return Err(LifeError::PatternTooLarge {
                pattern: self.name().to_owned(),
                needed_width: tile.width,
                needed_height: tile.height,
                width: dimensions.width(),
                height: dimensions.height(),
            });
        }

        let across = offsets(tile.width, dimensions.width());
        let down = offsets(tile.height, dimensions.height());

        let tiles = across.len().saturating_mul(down.len());
        let mut cells = Vec::with_capacity(tiles.saturating_mul(tile.cells.len()));
        for oy in &down {
            for ox in &across {
                cells.extend(tile.cells.iter().map(|(x, y)| {
                    Coordinate::new(ox.saturating_add(*x), oy.saturating_add(*y))
                }));
            }
        }
        Ok(cells)
    }
}

impl FromStr for Pattern {
    type Err = LifeError;

    /// Parse a pattern name. `random` and `user` come back with default
    /// parameters; use [`Pattern::from_config`] to fill them in.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blinkers" | "blinker" => Ok(Self::Blinkers),
            "toads" | "toad" => Ok(Self::Toads),
            "beacons" | "beacon" => Ok(Self::Beacons),
            "pulsars" | "pulsar" => Ok(Self::Pulsars),
            "gliders" | "glider" => Ok(Self::Gliders),
            "blocks" | "block" => Ok(Self::Blocks),
            "beehives" | "beehive" => Ok(Self::Beehives),
            "loaves" | "loaf" => Ok(Self::Loaves),
            "boats" | "boat" => Ok(Self::Boats),
            "single" => Ok(Self::Single),
            "random" => Ok(Self::Random {
                seed: DEFAULT_RANDOM_SEED,
                density_percent: DEFAULT_DENSITY_PERCENT,
            }),
            "user" => Ok(Self::User(Vec::new())),
            _ => Err(LifeError::UnknownPattern { name: s.to_owned() }),
        }
    }
}

impl core::fmt::Display for Pattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-left offsets of every tile that fits along one axis.
fn offsets(tile: u32, board: u32) -> Vec<i64> {
    let stride = tile.saturating_add(TILE_MARGIN);
    let mut found = Vec::new();
    let mut offset: u32 = 0;
    while offset.saturating_add(tile) <= board {
        found.push(i64::from(offset));
        let Some(next) = offset.checked_add(stride) else {
            break;
        };
        offset = next;
    }
    found
}

fn random(
    dimensions: Dimensions,
    seed: u64,
    density_percent: u8,
) -> Result<Vec<Coordinate>, LifeError> {
    if density_percent > 100 {
        return Err(LifeError::InvalidDensity {
            percent: density_percent,
        });
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    Ok(dimensions
        .cells()
        .filter(|_| rng.random_range(0..100_u8) < density_percent)
        .collect())
}
