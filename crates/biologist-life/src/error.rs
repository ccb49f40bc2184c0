//! Error types for the `biologist-life` crate.

/// Errors that can occur while building or stepping a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifeError {
    /// A board needs at least one row and one column.
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The rule string is not valid `B.../S...` notation.
    #[error("invalid rule {rule:?}: {reason}")]
    InvalidRule {
        /// The rejected rule string.
        rule: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The pattern name is not recognized.
    #[error("unknown pattern {name:?}")]
    UnknownPattern {
        /// The rejected pattern name.
        name: String,
    },

    /// A tiled pattern does not fit on the board even once.
    #[error("pattern {pattern} needs {needed_width}x{needed_height}, board is {width}x{height}")]
    PatternTooLarge {
        /// Name of the pattern.
        pattern: String,
        /// Minimum width the pattern needs.
        needed_width: u32,
        /// Minimum height the pattern needs.
        needed_height: u32,
        /// Board width.
        width: u32,
        /// Board height.
        height: u32,
    },

    /// Random density must be a percentage.
    #[error("density {percent}% is not within 0..=100")]
    InvalidDensity {
        /// The rejected percentage.
        percent: u8,
    },

    /// A seed cell lies outside the board.
    #[error("cell ({x}, {y}) is outside the {width}x{height} board")]
    CellOutOfBounds {
        /// Column of the rejected cell.
        x: i64,
        /// Row of the rejected cell.
        y: i64,
        /// Board width.
        width: u32,
        /// Board height.
        height: u32,
    },

    /// The generation counter cannot advance any further.
    #[error("generation counter exhausted at {sequence}")]
    GenerationOverflow {
        /// The last sequence number produced.
        sequence: u64,
    },
}
