//! The engine handle: initialize, start, stop, and query.
//!
//! A [`Biologist`] owns one analysis pipeline. [`Biologist::initialize`]
//! analyzes and stores the seed. [`Biologist::start`] spawns a single
//! worker that pulls generations from the [`GenerationSource`] and feeds
//! them to the [`Analyzer`] until the board settles, the source closes, a
//! contract violation occurs, or [`Biologist::stop`] is called.
//!
//! Queries run concurrently with the worker and never wait on simulation
//! progress:
//!
//! - `n < count`: the stored analysis.
//! - `n >= count` with a detected cycle: a copy of the analysis at
//!   `start + (n - start) % length`, marked `Stable` (or `Dead` for an
//!   empty board).
//! - otherwise: [`QueryError::NotAvailable`].

use std::sync::{Arc, OnceLock};

use biologist_types::{Analysis, BiologistId, CycleInfo, Generation, Status};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::analyzer::{Analyzer, EngineError};
use crate::config::EngineConfig;
use crate::source::{GenerationSource, StopHandle};
use crate::store::{AnalysisStore, StoreError};

/// Errors returned by analysis queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Negative generation numbers are never valid.
    #[error("generation {generation} is negative")]
    Negative {
        /// The rejected generation number.
        generation: i64,
    },

    /// The generation has not been analyzed and no cycle is known yet.
    #[error("generation {generation} not available ({analyzed} analyzed, no cycle detected)")]
    NotAvailable {
        /// The requested generation.
        generation: u64,
        /// Number of analyses stored when the query was answered.
        analyzed: u64,
    },

    /// The analysis store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// Why the analysis worker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    /// The board reached a terminal status (`Stable` or `Dead`).
    Settled(Status),
    /// [`Biologist::stop`] was called.
    Stopped,
    /// The source closed its stream while the board was still active.
    SourceClosed,
    /// The source broke its contract or the store failed.
    Failed(EngineError),
}

impl core::fmt::Display for WorkerExit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Settled(status) => write!(f, "settled ({status})"),
            Self::Stopped => write!(f, "stopped"),
            Self::SourceClosed => write!(f, "source closed"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// State waiting for [`Biologist::start`].
struct Pending {
    analyzer: Analyzer,
    source: Box<dyn GenerationSource>,
    seed_status: Status,
}

/// One analysis pipeline and its query surface.
pub struct Biologist {
    id: BiologistId,
    created_at: DateTime<Utc>,
    store: AnalysisStore,
    cycle: Arc<OnceLock<CycleInfo>>,
    update_buffer: usize,
    /// Raised by `stop`; observed by the worker.
    shutdown: StopHandle,
    /// Raised once the worker has ended, however it ended.
    finished: StopHandle,
    exit: Arc<OnceLock<WorkerExit>>,
    pending: Mutex<Option<Pending>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Biologist {
    /// Analyze and store the seed generation.
    ///
    /// The source is held until [`start`](Self::start) is called.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SeedSequence`] if the seed is not generation
    /// 0, or a store error.
    pub async fn initialize(
        seed: Generation,
        source: Box<dyn GenerationSource>,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let id = BiologistId::new();
        let store = AnalysisStore::new(config.store_buffer);
        let cycle = Arc::new(OnceLock::new());
        let living = seed.living.len();

        let (analyzer, seed_status) =
            Analyzer::initialize(store.clone(), Arc::clone(&cycle), seed).await?;
        info!(%id, living, status = %seed_status, "Biologist initialized");

        Ok(Self {
            id,
            created_at: Utc::now(),
            store,
            cycle,
            update_buffer: config.update_buffer.max(1),
            shutdown: StopHandle::new(),
            finished: StopHandle::new(),
            exit: Arc::new(OnceLock::new()),
            pending: Mutex::new(Some(Pending {
                analyzer,
                source,
                seed_status,
            })),
            worker: Mutex::new(None),
        })
    }

    /// Start the source and the analysis worker.
    ///
    /// A dead seed needs no further generations: the engine settles
    /// immediately without starting the source.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Stopped`] after [`stop`](Self::stop), or
    /// [`EngineError::AlreadyStarted`] on a second call.
    pub async fn start(&self) -> Result<(), EngineError> {
        if self.shutdown.is_stopped() {
            return Err(EngineError::Stopped);
        }

        let mut worker = self.worker.lock().await;
        let Some(pending) = self.pending.lock().await.take() else {
            return Err(EngineError::AlreadyStarted);
        };

        if !pending.seed_status.is_active() {
            info!(
                id = %self.id,
                status = %pending.seed_status,
                "Seed already settled; source not started"
            );
            self.finish(WorkerExit::Settled(pending.seed_status));
            return Ok(());
        }

        let job = Worker {
            id: self.id,
            analyzer: pending.analyzer,
            source: pending.source,
            update_buffer: self.update_buffer,
            shutdown: self.shutdown.clone(),
            finished: self.finished.clone(),
            exit: Arc::clone(&self.exit),
        };
        *worker = Some(tokio::spawn(job.run()));
        drop(worker);

        info!(id = %self.id, "Biologist started");
        Ok(())
    }

    /// Halt the source and the worker.
    ///
    /// One-way and idempotent. When this returns the worker has ended, so
    /// [`analysis_count`](Self::analysis_count) no longer changes.
    pub async fn stop(&self) {
        if !self.shutdown.is_stopped() {
            info!(id = %self.id, "Stopping biologist");
        }
        self.shutdown.stop();

        // Held across the join so concurrent callers also wait for the worker.
        let mut worker = self.worker.lock().await;
        if let Some(handle) = worker.take()
            && let Err(err) = handle.await
        {
            warn!(id = %self.id, error = %err, "Analysis worker did not exit cleanly");
            self.finish(WorkerExit::Stopped);
        }
        if self.pending.lock().await.take().is_some() {
            self.finish(WorkerExit::Stopped);
        }
        drop(worker);
    }

    /// Wait until the worker has ended, on its own or through
    /// [`stop`](Self::stop).
    pub async fn finished(&self) {
        self.finished.stopped().await;
    }

    /// Whether the worker has ended.
    pub fn is_finished(&self) -> bool {
        self.finished.is_stopped()
    }

    /// The analysis for generation `generation`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Negative`] for a negative generation,
    /// [`QueryError::NotAvailable`] if it lies past the stored prefix and
    /// no cycle is known, or a store error.
    pub async fn analysis(&self, generation: i64) -> Result<Arc<Analysis>, QueryError> {
        let Ok(index) = u64::try_from(generation) else {
            return Err(QueryError::Negative { generation });
        };
        self.analysis_at(index).await
    }

    /// The analysis for a non-negative generation number.
    ///
    /// # Errors
    ///
    /// See [`analysis`](Self::analysis).
    pub async fn analysis_at(&self, generation: u64) -> Result<Arc<Analysis>, QueryError> {
        // The cycle is published after the last append, so reading it first
        // guarantees the count below is final whenever a cycle is seen.
        let cycle = self.cycle();
        let analyzed = self.store.count().await?;
        if generation < analyzed {
            return Ok(self.store.get(generation).await?);
        }

        let Some(cycle) = cycle else {
            return Err(QueryError::NotAvailable {
                generation,
                analyzed,
            });
        };

        let representative = cycle.remap(generation);
        debug!(id = %self.id, generation, representative, %cycle, "Virtual query remapped");
        let stored = self.store.get(representative).await?;
        Ok(Arc::new(stored.as_cycle_repeat()))
    }

    /// Up to `max` consecutive analyses beginning at `start`.
    ///
    /// Stops early at the first generation that is not available, so an
    /// empty result means `start` itself is not available yet.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Negative`] for a negative `start`, or a store
    /// error.
    pub async fn analyses(&self, start: i64, max: usize) -> Result<Vec<Arc<Analysis>>, QueryError> {
        let Ok(mut next) = u64::try_from(start) else {
            return Err(QueryError::Negative { generation: start });
        };

        let mut found = Vec::new();
        while found.len() < max {
            match self.analysis_at(next).await {
                Ok(analysis) => found.push(analysis),
                Err(QueryError::NotAvailable { .. }) => break,
                Err(err) => return Err(err),
            }
            let Some(following) = next.checked_add(1) else {
                break;
            };
            next = following;
        }
        Ok(found)
    }

    /// Number of analyses actually stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Closed`] if the store worker is gone.
    pub async fn analysis_count(&self) -> Result<u64, StoreError> {
        self.store.count().await
    }

    /// The detected cycle, if any.
    pub fn cycle(&self) -> Option<CycleInfo> {
        self.cycle.get().copied()
    }

    /// Why the worker ended, once it has.
    pub fn exit(&self) -> Option<WorkerExit> {
        self.exit.get().cloned()
    }

    /// Unique identifier of this engine.
    pub const fn id(&self) -> BiologistId {
        self.id
    }

    /// When this engine was initialized.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn finish(&self, outcome: WorkerExit) {
        let _ = self.exit.set(outcome);
        self.finished.stop();
    }
}

/// Dropping an engine halts its worker and source as [`Biologist::stop`]
/// would, without waiting for the worker to end.
impl Drop for Biologist {
    fn drop(&mut self) {
        self.shutdown.stop();
    }
}

impl core::fmt::Debug for Biologist {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Biologist")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("cycle", &self.cycle())
            .field("exit", &self.exit())
            .finish_non_exhaustive()
    }
}

impl core::fmt::Display for Biologist {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Biologist {}", self.id)
    }
}

/// Everything the spawned worker owns.
struct Worker {
    id: BiologistId,
    analyzer: Analyzer,
    source: Box<dyn GenerationSource>,
    update_buffer: usize,
    shutdown: StopHandle,
    finished: StopHandle,
    exit: Arc<OnceLock<WorkerExit>>,
}

impl Worker {
    async fn run(self) {
        let Self {
            id,
            mut analyzer,
            source,
            update_buffer,
            shutdown,
            finished,
            exit,
        } = self;

        let (updates_tx, mut updates) = mpsc::channel(update_buffer);
        let source_stop = source.start(updates_tx);

        let outcome = loop {
            let received = tokio::select! {
                biased;
                () = shutdown.stopped() => break WorkerExit::Stopped,
                received = updates.recv() => received,
            };
            let Some(generation) = received else {
                warn!(%id, "Generation source closed before the board settled");
                break WorkerExit::SourceClosed;
            };

            let sequence = generation.sequence;
            match analyzer.process(generation).await {
                Ok(status) if status.is_active() => {}
                Ok(status) => {
                    info!(%id, sequence, %status, cycle = ?analyzer.cycle(), "Board settled");
                    break WorkerExit::Settled(status);
                }
                Err(err) => {
                    error!(%id, sequence, error = %err, "Analysis worker failed");
                    break WorkerExit::Failed(err);
                }
            }
        };

        source_stop.stop();
        debug!(%id, exit = %outcome, "Analysis worker exiting");
        let _ = exit.set(outcome);
        finished.stop();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use biologist_types::Coordinate;

    use super::*;
    use crate::source::ReplaySource;

    fn cells(points: &[(i64, i64)]) -> Vec<Coordinate> {
        points.iter().copied().map(Coordinate::from).collect()
    }

    async fn biologist(seed: Vec<Coordinate>, source: ReplaySource) -> Biologist {
        Biologist::initialize(Generation::seed(seed), Box::new(source), &EngineConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn seed_is_queryable_before_start() {
        let engine = biologist(cells(&[(0, 0), (1, 1)]), ReplaySource::default()).await;
        let seed = engine.analysis(0).await.unwrap();
        assert_eq!(seed.status, Status::Active);
        assert_eq!(seed.changes.len(), 2);
        assert_eq!(engine.analysis_count().await.unwrap(), 1);
        assert!(engine.exit().is_none());
        assert!(!engine.is_finished());
    }

    #[tokio::test]
    async fn negative_and_future_queries_are_typed() {
        let engine = biologist(cells(&[(0, 0)]), ReplaySource::default()).await;
        assert_eq!(
            engine.analysis(-1).await.unwrap_err(),
            QueryError::Negative { generation: -1 }
        );
        assert_eq!(
            engine.analysis(4).await.unwrap_err(),
            QueryError::NotAvailable {
                generation: 4,
                analyzed: 1
            }
        );
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let source = ReplaySource::default().hold_open();
        let engine = biologist(cells(&[(0, 0)]), source).await;
        engine.start().await.unwrap();
        assert_eq!(engine.start().await.unwrap_err(), EngineError::AlreadyStarted);
        engine.stop().await;
    }

    #[tokio::test]
    async fn start_after_stop_is_rejected() {
        let engine = biologist(cells(&[(0, 0)]), ReplaySource::default()).await;
        engine.stop().await;
        assert_eq!(engine.start().await.unwrap_err(), EngineError::Stopped);
        assert_eq!(engine.exit(), Some(WorkerExit::Stopped));
        assert!(engine.is_finished());
    }

    #[tokio::test]
    async fn dead_seed_settles_without_a_source() {
        let engine = biologist(Vec::new(), ReplaySource::default().hold_open()).await;
        engine.start().await.unwrap();
        engine.finished().await;
        assert_eq!(engine.exit(), Some(WorkerExit::Settled(Status::Dead)));
        assert_eq!(engine.analysis(0).await.unwrap().status, Status::Dead);
    }

    #[tokio::test]
    async fn early_close_is_reported() {
        let source = ReplaySource::new([Generation::new(1, cells(&[(5, 5)]))]);
        let engine = biologist(cells(&[(0, 0)]), source).await;
        engine.start().await.unwrap();
        engine.finished().await;
        assert_eq!(engine.exit(), Some(WorkerExit::SourceClosed));
        assert_eq!(engine.analysis_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn stop_freezes_the_count() {
        let source = ReplaySource::new(
            (1..=10_000_u64).map(|n| Generation::new(n, cells(&[(i64::try_from(n).unwrap(), 0)]))),
        )
        .with_delay(Duration::from_millis(1));
        let engine = biologist(cells(&[(0, 0)]), source).await;
        engine.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        engine.stop().await;
        let frozen = engine.analysis_count().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(engine.analysis_count().await.unwrap(), frozen);

        engine.stop().await;
        assert_eq!(engine.analysis_count().await.unwrap(), frozen);
        assert_eq!(engine.exit(), Some(WorkerExit::Stopped));
    }

    /// Sends a fresh single-cell board every millisecond until stopped and
    /// shares its stop handle with the test.
    struct TickingSource {
        stop: StopHandle,
    }

    impl GenerationSource for TickingSource {
        fn start(self: Box<Self>, updates: mpsc::Sender<Generation>) -> StopHandle {
            let stop = self.stop.clone();
            tokio::spawn(async move {
                let mut sequence = 1_u64;
                while !stop.is_stopped() {
                    let cell = Coordinate::new(i64::try_from(sequence).unwrap(), 0);
                    if updates.send(Generation::new(sequence, [cell])).await.is_err() {
                        break;
                    }
                    sequence = sequence.saturating_add(1);
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            });
            self.stop
        }
    }

    #[tokio::test]
    async fn dropping_a_running_engine_stops_its_source() {
        let source_stop = StopHandle::new();
        let source = TickingSource {
            stop: source_stop.clone(),
        };
        let engine = Biologist::initialize(
            Generation::seed(cells(&[(0, 0)])),
            Box::new(source),
            &EngineConfig::default(),
        )
        .await
        .unwrap();
        engine.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!source_stop.is_stopped());

        drop(engine);
        tokio::time::timeout(Duration::from_secs(1), source_stop.stopped())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn display_names_the_engine() {
        let engine = biologist(cells(&[(0, 0)]), ReplaySource::default()).await;
        assert_eq!(engine.to_string(), format!("Biologist {}", engine.id()));
        assert!(format!("{engine:?}").starts_with("Biologist {"));
        assert!(engine.created_at() <= Utc::now());
    }
}
