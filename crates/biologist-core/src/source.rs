//! Generation source trait, stop handle, and replay implementation.
//!
//! A [`GenerationSource`] is the external engine that steps the automaton.
//! The analysis worker hands it the sending half of a bounded channel; the
//! source pushes generations `1, 2, 3, ...` into it (generation 0 is given
//! to [`Biologist::initialize`] directly) and returns a [`StopHandle`] the
//! worker uses to halt delivery.
//!
//! [`ReplaySource`] plays back a fixed list of generations, which lets the
//! engine be exercised end to end without a real automaton.
//!
//! [`Biologist::initialize`]: crate::biologist::Biologist::initialize

use std::collections::VecDeque;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use biologist_types::Generation;
use tokio::sync::{Notify, mpsc};
use tracing::debug;

/// Shared stop flag plus the notification that wakes waiters.
#[derive(Debug, Default)]
struct StopState {
    stopped: AtomicBool,
    notify: Notify,
}

/// One-way stop signal shared between a controller and a running task.
///
/// Cloning yields another handle to the same signal. [`stop`] is
/// idempotent: only the first call wakes waiters.
///
/// [`stop`]: StopHandle::stop
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    state: Arc<StopState>,
}

impl StopHandle {
    /// Create a handle in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop and wake every task waiting in [`stopped`].
    ///
    /// [`stopped`]: StopHandle::stopped
    pub fn stop(&self) {
        if !self.state.stopped.swap(true, Ordering::AcqRel) {
            self.state.notify.notify_waiters();
        }
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::Acquire)
    }

    /// Wait until [`stop`](Self::stop) has been called.
    ///
    /// Returns immediately if it already has.
    pub async fn stopped(&self) {
        let mut notified = pin!(self.state.notify.notified());
        // Register before checking the flag so a concurrent stop is not lost.
        notified.as_mut().enable();
        if self.is_stopped() {
            return;
        }
        notified.await;
    }
}

/// An external producer of generations.
///
/// Implementations deliver generations in strictly increasing sequence
/// order starting at 1, one per send, until stopped or until the receiver
/// is dropped. After [`StopHandle::stop`] returns no new send may begin,
/// though one already in flight may still complete.
pub trait GenerationSource: Send {
    /// Begin delivering generations into `updates`.
    ///
    /// Must be called from within a tokio runtime. Returns the handle that
    /// halts delivery.
    fn start(self: Box<Self>, updates: mpsc::Sender<Generation>) -> StopHandle;
}

/// A source that replays a fixed list of generations.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    generations: VecDeque<Generation>,
    delay: Duration,
    hold_open: bool,
}

impl ReplaySource {
    /// Replay `generations` in order with no delay, then close the stream.
    pub fn new(generations: impl IntoIterator<Item = Generation>) -> Self {
        Self {
            generations: generations.into_iter().collect(),
            delay: Duration::ZERO,
            hold_open: false,
        }
    }

    /// Wait `delay` before each delivery.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Keep the stream open after the last generation until stopped,
    /// instead of closing it.
    #[must_use]
    pub const fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Number of generations still to be delivered.
    pub fn remaining(&self) -> usize {
        self.generations.len()
    }
}

impl GenerationSource for ReplaySource {
    fn start(self: Box<Self>, updates: mpsc::Sender<Generation>) -> StopHandle {
        let handle = StopHandle::new();
        let stop = handle.clone();
        let Self {
            generations,
            delay,
            hold_open,
        } = *self;

        tokio::spawn(async move {
            for generation in generations {
                if !delay.is_zero() {
                    tokio::select! {
                        biased;
                        () = stop.stopped() => return,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                let sequence = generation.sequence;
                tokio::select! {
                    biased;
                    () = stop.stopped() => return,
                    sent = updates.send(generation) => {
                        if sent.is_err() {
                            debug!(sequence, "Replay receiver dropped");
                            return;
                        }
                    }
                }
            }
            if hold_open {
                stop.stopped().await;
            }
            debug!("Replay source finished");
        });

        handle
    }
}
