//! [`LifeSource`]: a [`GenerationSource`] that steps a [`Board`] on a
//! tokio task.

use std::time::Duration;

use biologist_core::config::BoardConfig;
use biologist_core::{GenerationSource, StopHandle};
use biologist_types::Generation;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::board::{Board, Dimensions};
use crate::error::LifeError;
use crate::pattern::Pattern;
use crate::rules::RuleSet;

/// Steps a bounded board and delivers each generation.
#[derive(Debug, Clone)]
pub struct LifeSource {
    board: Board,
    interval: Duration,
}

impl LifeSource {
    /// Seed a board with `pattern` and prepare to step it every `interval`
    /// (zero steps as fast as the receiver accepts generations).
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern cannot be laid out on the board.
    pub fn new(
        dimensions: Dimensions,
        pattern: &Pattern,
        rules: RuleSet,
        interval: Duration,
    ) -> Result<Self, LifeError> {
        let seed = pattern.seed(dimensions)?;
        let board = Board::new(dimensions, rules, seed)?;
        info!(
            %dimensions,
            %pattern,
            %rules,
            population = board.population(),
            "Life board seeded"
        );
        Ok(Self { board, interval })
    }

    /// Build a source from the `board` section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid dimensions, an unparsable rule, an
    /// unknown pattern, or a pattern that does not fit.
    pub fn from_config(config: &BoardConfig) -> Result<Self, LifeError> {
        let dimensions = Dimensions::new(config.width, config.height)?;
        let rules: RuleSet = config.rule.parse()?;
        let pattern = Pattern::from_config(config)?;
        Self::new(
            dimensions,
            &pattern,
            rules,
            Duration::from_millis(config.tick_interval_ms),
        )
    }

    /// Generation 0: the seeded board.
    pub fn seed(&self) -> Generation {
        self.board.snapshot()
    }

    /// Board size.
    pub const fn dimensions(&self) -> Dimensions {
        self.board.dimensions()
    }
}

impl GenerationSource for LifeSource {
    fn start(self: Box<Self>, updates: mpsc::Sender<Generation>) -> StopHandle {
        let handle = StopHandle::new();
        let stop = handle.clone();
        let Self {
            mut board,
            interval,
        } = *self;

        tokio::spawn(async move {
            loop {
                if !interval.is_zero() {
                    tokio::select! {
                        biased;
                        () = stop.stopped() => break,
                        () = tokio::time::sleep(interval) => {}
                    }
                }

                let generation = match board.step() {
                    Ok(generation) => generation,
                    Err(err) => {
                        warn!(error = %err, "Life board cannot advance");
                        break;
                    }
                };

                let sequence = generation.sequence;
                tokio::select! {
                    biased;
                    () = stop.stopped() => break,
                    sent = updates.send(generation) => {
                        if sent.is_err() {
                            debug!(sequence, "Generation receiver dropped");
                            break;
                        }
                    }
                }
            }
            debug!(sequence = board.sequence(), "Life source stopped");
        });

        handle
    }
}
