//! Polling session management
//!
//! A [`PollingSession`] owns at most one recurring timer for one feed. Starting
//! a new timer always stops the previous one first, `stop()` is idempotent,
//! and dropping the session stops the timer as well. Once stopped, a timer
//! never fires its tick again.

use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::types::FeedKind;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};

/// `true` once cancelled. A tick holds the lock for its whole run, so
/// cancelling waits out a tick already in progress on another worker.
type CancelGate = Arc<Mutex<bool>>;

struct TimerHandle {
    cancelled: CancelGate,
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TimerHandle {
    fn cancel(mut self) {
        *self
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        self.task.abort();
    }
}

/// Run one tick unless cancelled. Returns `false` once the timer is cancelled.
fn run_tick<F: Fn()>(gate: &Mutex<bool>, tick: &F) -> bool {
    let cancelled = gate.lock().unwrap_or_else(PoisonError::into_inner);
    if *cancelled {
        return false;
    }
    tick();
    true
}

/// Per-feed polling state, owned exclusively by its scheduling unit
pub struct PollingSession {
    feed: FeedKind,
    timer: Option<TimerHandle>,
    started: u64,
    logger: StructuredLogger,
}

impl PollingSession {
    pub fn new(feed: FeedKind) -> Self {
        let context = LogContext::new("session").with_field("feed", feed.to_string());
        Self {
            feed,
            timer: None,
            started: 0,
            logger: get_logger_with_context(context),
        }
    }

    pub fn feed(&self) -> FeedKind {
        self.feed
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Number of timers this session has started over its lifetime
    pub fn started_count(&self) -> u64 {
        self.started
    }

    /// Start a recurring timer; the first tick fires one `period` from now.
    ///
    /// Any running timer is stopped before the new one is created. Must be
    /// called from within a tokio runtime.
    pub fn start<F>(&mut self, period: Duration, tick: F)
    where
        F: Fn() + Send + 'static,
    {
        self.stop();
        if period.is_zero() {
            self.logger
                .warn("Refusing to start polling with a zero interval");
            return;
        }

        let cancelled: CancelGate = Arc::new(Mutex::new(false));
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let first_tick = Instant::now() + period;
        let flag = Arc::clone(&cancelled);

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if !run_tick(&flag, &tick) {
                            break;
                        }
                    }
                }
            }
        });

        self.started = self.started.saturating_add(1);
        self.timer = Some(TimerHandle {
            cancelled,
            stop_tx: Some(stop_tx),
            task,
        });
        self.logger.debug(&format!(
            "Polling started, interval {} ms",
            period.as_millis()
        ));
    }

    /// Stop the running timer, if any. Returns whether one was running.
    ///
    /// A tick already running on another worker finishes before this returns,
    /// and no tick runs afterwards.
    pub fn stop(&mut self) -> bool {
        match self.timer.take() {
            Some(handle) => {
                handle.cancel();
                self.logger.debug("Polling stopped");
                true
            }
            None => false,
        }
    }
}

impl Drop for PollingSession {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.cancel();
        }
    }
}

impl std::fmt::Debug for PollingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingSession")
            .field("feed", &self.feed)
            .field("active", &self.is_active())
            .field("started", &self.started)
            .finish()
    }
}
