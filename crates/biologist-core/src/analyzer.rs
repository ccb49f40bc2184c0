//! Per-generation analysis: classification, diffing, and storage.
//!
//! The [`Analyzer`] is owned by exactly one worker. It is the only writer to
//! the [`AnalysisStore`] and the only user of the [`StabilityDetector`], and
//! it publishes the detected cycle through a shared [`OnceLock`] so readers
//! can remap queries without touching the detector.
//!
//! For each generation `n >= 1`:
//!
//! 1. The analysis of `n - 1` must already be stored; anything else is a
//!    broken source and fails with [`EngineError::SequenceGap`].
//! 2. Changes are diffed against generation `n - 1`.
//! 3. The tentative status is `Dead` for an empty board, `Active` otherwise.
//! 4. The detector sees the board. If it recognizes a repeat, the status
//!    becomes `Stable` (an empty board stays `Dead`) and the analysis is
//!    **not** stored: the revealing generation is a copy of an earlier one.
//! 5. Otherwise the analysis is appended.

use std::sync::{Arc, OnceLock};

use biologist_types::{Analysis, CycleInfo, Generation, Status};
use tracing::{debug, info};

use crate::changes;
use crate::stability::StabilityDetector;
use crate::store::{AnalysisStore, StoreError};

/// Errors raised while driving an engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The seed handed to `initialize` was not generation 0.
    #[error("seed generation must have sequence 0, got {sequence}")]
    SeedSequence {
        /// Sequence number of the rejected seed.
        sequence: u64,
    },

    /// The source skipped or repeated a generation.
    #[error("generation {received} arrived but generation {expected} was expected")]
    SequenceGap {
        /// The sequence number the engine was waiting for.
        expected: u64,
        /// The sequence number that actually arrived.
        received: u64,
    },

    /// A generation arrived after the cycle was already closed.
    #[error("generation {sequence} arrived after the cycle was detected")]
    CycleClosed {
        /// Sequence number of the late generation.
        sequence: u64,
    },

    /// The engine has already been started.
    #[error("engine already started")]
    AlreadyStarted,

    /// The engine has been stopped and cannot be restarted.
    #[error("engine has been stopped")]
    Stopped,

    /// The analysis store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// Worker-owned analysis state.
#[derive(Debug)]
pub struct Analyzer {
    store: AnalysisStore,
    detector: StabilityDetector,
    cycle: Arc<OnceLock<CycleInfo>>,
}

impl Analyzer {
    /// Analyze the seed generation and store it unconditionally.
    ///
    /// Every seed cell is `Born`. The seed's fingerprint is recorded so a
    /// later return to the initial board is recognized as a cycle starting
    /// at 0. Returns the analyzer and the seed's status.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SeedSequence`] if `seed.sequence != 0`, or a
    /// store error if the append fails.
    pub async fn initialize(
        store: AnalysisStore,
        cycle: Arc<OnceLock<CycleInfo>>,
        seed: Generation,
    ) -> Result<(Self, Status), EngineError> {
        if seed.sequence != 0 {
            return Err(EngineError::SeedSequence {
                sequence: seed.sequence,
            });
        }

        let mut detector = StabilityDetector::new();
        detector.observe(&seed.living, 0);

        let status = Status::from_population(seed.living.len());
        let analysis = Analysis {
            status,
            changes: changes::seeded(&seed.living),
            living: seed.living,
        };
        store.append(analysis).await?;

        Ok((
            Self {
                store,
                detector,
                cycle,
            },
            status,
        ))
    }

    /// Analyze the next generation and return its status.
    ///
    /// The caller should keep feeding generations only while the returned
    /// status is [`Status::Active`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SequenceGap`] if `generation` is not the one
    /// directly after the last stored analysis, [`EngineError::CycleClosed`]
    /// if a cycle was already detected, or a store error.
    pub async fn process(&mut self, generation: Generation) -> Result<Status, EngineError> {
        let sequence = generation.sequence;
        if self.detector.is_detected() {
            return Err(EngineError::CycleClosed { sequence });
        }

        let expected = self.store.count().await?;
        if sequence != expected {
            return Err(EngineError::SequenceGap {
                expected,
                received: sequence,
            });
        }

        let previous = self.store.get(sequence.saturating_sub(1)).await?;
        let changes = changes::detect(&previous.living, &generation.living);
        let status = Status::from_population(generation.living.len());

        if self.detector.observe(&generation.living, sequence) {
            if let Some(cycle) = self.detector.cycle() {
                let _ = self.cycle.set(cycle);
            }
            let status = if status == Status::Dead {
                Status::Dead
            } else {
                Status::Stable
            };
            info!(sequence, %status, "Board state repeats; analysis settled");
            return Ok(status);
        }

        debug!(
            sequence,
            %status,
            living = generation.living.len(),
            changes = changes.len(),
            "Generation analyzed"
        );
        if status == Status::Dead {
            info!(sequence, "Board died out");
        }

        self.store
            .append(Analysis {
                status,
                living: generation.living,
                changes,
            })
            .await?;

        Ok(status)
    }

    /// The detected cycle, if any.
    pub const fn cycle(&self) -> Option<CycleInfo> {
        self.detector.cycle()
    }
}
