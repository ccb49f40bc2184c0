//! Append-only analysis store confined to a single worker task.
//!
//! The backing `Vec` is owned by one spawned task. Every operation is a
//! request sent over an `mpsc` channel with a `oneshot` reply, so the worker
//! applies them one at a time: a reader never sees a half-applied append and
//! concurrent appends are serialized in arrival order. [`AnalysisStore`] is a
//! cheap cloneable handle; the worker exits once every handle is dropped.
//!
//! Entries are addressed by sequence number. The entry at index `i` is the
//! analysis of generation `i`, and indices `0..count` are always contiguous.

use std::sync::Arc;

use biologist_types::Analysis;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Default capacity of the request channel.
pub const DEFAULT_STORE_BUFFER: usize = 64;

/// Errors returned by [`AnalysisStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The index is outside `0..count`.
    #[error("analysis index {index} out of range (count {count})")]
    OutOfRange {
        /// The requested index.
        index: u64,
        /// Number of analyses stored when the request was served.
        count: u64,
    },

    /// The worker task is no longer running.
    #[error("analysis store worker has shut down")]
    Closed,
}

/// A request to the store worker, carrying its reply channel.
#[derive(Debug)]
enum StoreRequest {
    Append {
        analysis: Arc<Analysis>,
        reply: oneshot::Sender<u64>,
    },
    Get {
        index: u64,
        reply: oneshot::Sender<Result<Arc<Analysis>, StoreError>>,
    },
    GetAll {
        reply: oneshot::Sender<Vec<Arc<Analysis>>>,
    },
    Count {
        reply: oneshot::Sender<u64>,
    },
}

/// Handle to the append-only analysis store.
#[derive(Debug, Clone)]
pub struct AnalysisStore {
    requests: mpsc::Sender<StoreRequest>,
}

impl AnalysisStore {
    /// Spawn the store worker on the current tokio runtime.
    ///
    /// `buffer` bounds the number of queued requests; zero is treated as one.
    pub fn new(buffer: usize) -> Self {
        let (requests, inbox) = mpsc::channel(buffer.max(1));
        tokio::spawn(serve(inbox));
        Self { requests }
    }

    /// Append an analysis and return the sequence number it was stored at.
    pub async fn append(&self, analysis: Analysis) -> Result<u64, StoreError> {
        let (reply, response) = oneshot::channel();
        self.send(StoreRequest::Append {
            analysis: Arc::new(analysis),
            reply,
        })
        .await?;
        response.await.map_err(|_closed| StoreError::Closed)
    }

    /// Fetch the analysis stored at `index`.
    pub async fn get(&self, index: u64) -> Result<Arc<Analysis>, StoreError> {
        let (reply, response) = oneshot::channel();
        self.send(StoreRequest::Get { index, reply }).await?;
        response.await.map_err(|_closed| StoreError::Closed)?
    }

    /// Snapshot every stored analysis in sequence order.
    ///
    /// Later appends do not affect the returned vector.
    pub async fn get_all(&self) -> Result<Vec<Arc<Analysis>>, StoreError> {
        let (reply, response) = oneshot::channel();
        self.send(StoreRequest::GetAll { reply }).await?;
        response.await.map_err(|_closed| StoreError::Closed)
    }

    /// Number of analyses stored.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let (reply, response) = oneshot::channel();
        self.send(StoreRequest::Count { reply }).await?;
        response.await.map_err(|_closed| StoreError::Closed)
    }

    async fn send(&self, request: StoreRequest) -> Result<(), StoreError> {
        self.requests
            .send(request)
            .await
            .map_err(|_closed| StoreError::Closed)
    }
}

fn count_of(analyses: &[Arc<Analysis>]) -> u64 {
    u64::try_from(analyses.len()).unwrap_or(u64::MAX)
}

/// Worker loop: sole owner of the backing vector.
async fn serve(mut inbox: mpsc::Receiver<StoreRequest>) {
    let mut analyses: Vec<Arc<Analysis>> = Vec::new();

    while let Some(request) = inbox.recv().await {
        match request {
            StoreRequest::Append { analysis, reply } => {
                let index = count_of(&analyses);
                analyses.push(analysis);
                let _ = reply.send(index);
            }
            StoreRequest::Get { index, reply } => {
                let found = usize::try_from(index)
                    .ok()
                    .and_then(|i| analyses.get(i))
                    .cloned()
                    .ok_or_else(|| StoreError::OutOfRange {
                        index,
                        count: count_of(&analyses),
                    });
                let _ = reply.send(found);
            }
            StoreRequest::GetAll { reply } => {
                let _ = reply.send(analyses.clone());
            }
            StoreRequest::Count { reply } => {
                let _ = reply.send(count_of(&analyses));
            }
        }
    }

    debug!(count = analyses.len(), "Analysis store worker exiting");
}
