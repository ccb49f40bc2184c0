//! Birth/survival rules in `B.../S...` notation.
//!
//! A rule lists the neighbour counts at which a dead cell is born and the
//! counts at which a living cell survives. Conway's Game of Life is
//! `B3/S23`.

use std::str::FromStr;

use crate::error::LifeError;

/// Number of possible neighbour counts (0 through 8).
const COUNTS: usize = 9;

/// Which neighbour counts cause birth and which allow survival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSet {
    birth: [bool; COUNTS],
    survival: [bool; COUNTS],
}

impl RuleSet {
    /// Conway's Game of Life, `B3/S23`.
    pub const fn conway() -> Self {
        Self {
            birth: [false, false, false, true, false, false, false, false, false],
            survival: [false, false, true, true, false, false, false, false, false],
        }
    }

    /// Whether a cell with `neighbours` living neighbours is alive in the
    /// next generation.
    pub fn next_alive(&self, neighbours: u8, alive: bool) -> bool {
        let table = if alive { &self.survival } else { &self.birth };
        table.get(usize::from(neighbours)).copied().unwrap_or(false)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::conway()
    }
}

impl FromStr for RuleSet {
    type Err = LifeError;

    /// Parse `B3/S23` style notation. Case-insensitive; either half may be
    /// empty (`B3/S`), but both prefixes are required. `B0` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| LifeError::InvalidRule {
            rule: s.to_owned(),
            reason: reason.to_owned(),
        };

        let upper = s.trim().to_ascii_uppercase();
        let (born, survives) = upper
            .split_once('/')
            .ok_or_else(|| invalid("expected B.../S..."))?;
        let born = born
            .strip_prefix('B')
            .ok_or_else(|| invalid("birth half must start with B"))?;
        let survives = survives
            .strip_prefix('S')
            .ok_or_else(|| invalid("survival half must start with S"))?;

        let birth = counts(born).ok_or_else(|| invalid("neighbour counts must be digits 0-8"))?;
        let survival =
            counts(survives).ok_or_else(|| invalid("neighbour counts must be digits 0-8"))?;
        if birth[0] {
            return Err(invalid("B0 is not supported"));
        }

        Ok(Self { birth, survival })
    }
}

impl core::fmt::Display for RuleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("B")?;
        write_counts(f, &self.birth)?;
        f.write_str("/S")?;
        write_counts(f, &self.survival)
    }
}

fn counts(digits: &str) -> Option<[bool; COUNTS]> {
    let mut table = [false; COUNTS];
    for digit in digits.chars() {
        let count = usize::try_from(digit.to_digit(10)?).ok()?;
        *table.get_mut(count)? = true;
    }
    Some(table)
}

fn write_counts(f: &mut core::fmt::Formatter<'_>, table: &[bool; COUNTS]) -> core::fmt::Result {
    for (count, set) in table.iter().enumerate() {
        if *set {
            write!(f, "{count}")?;
        }
    }
    Ok(())
}
