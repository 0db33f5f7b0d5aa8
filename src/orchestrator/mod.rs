//! Fetch orchestration
//!
//! Four scheduling units, one per feed, each a dependency-tracked task: on
//! every evaluation a unit reads its inputs from the [`FetchContext`] and
//! re-runs only if they differ from the previous run. Units never look at
//! each other's state; the only thing they share is the dispatcher.

pub mod grid;
pub mod history;
pub mod overlay;
pub mod tracked;

pub use grid::GridDataPoller;
pub use history::{ZoneHistoryFetch, history_fetch_request, needs_refetch};
pub use overlay::{OverlayPoller, OverlayState};
pub use tracked::Tracked;

use crate::actions::SharedDispatcher;
use crate::config::FetchConfig;
use crate::context::{DashboardInputs, FetchContext};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::types::FeedKind;
use tokio::sync::mpsc;
use tokio::time::Duration;

/// Which units acted during one evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    pub zone_history: bool,
    pub grid_data: bool,
    pub wind: bool,
    pub solar: bool,
}

impl EvaluationReport {
    pub fn any(&self) -> bool {
        self.zone_history || self.grid_data || self.wind || self.solar
    }
}

pub struct FetchOrchestrator {
    dispatcher: SharedDispatcher,
    zone_history: ZoneHistoryFetch,
    grid: GridDataPoller,
    wind: OverlayPoller,
    solar: OverlayPoller,
    evaluations: u64,
    logger: StructuredLogger,
}

impl FetchOrchestrator {
    /// Create the four units; `interval` is the live polling cadence
    pub fn new(dispatcher: SharedDispatcher, interval: Duration) -> Self {
        let context = LogContext::new("orchestrator")
            .with_session_id(uuid::Uuid::new_v4().to_string());
        Self {
            dispatcher,
            zone_history: ZoneHistoryFetch::new(),
            grid: GridDataPoller::new(interval),
            wind: OverlayPoller::wind(interval),
            solar: OverlayPoller::solar(interval),
            evaluations: 0,
            logger: get_logger_with_context(context),
        }
    }

    pub fn from_config(config: &FetchConfig, dispatcher: SharedDispatcher) -> Self {
        Self::new(dispatcher, config.data_fetch_interval())
    }

    /// Re-evaluate every unit against `ctx`, in a fixed order.
    ///
    /// Each unit runs to completion, dispatch included, before the next one
    /// starts. Units whose inputs did not change do nothing.
    pub fn evaluate(&mut self, ctx: &FetchContext) -> EvaluationReport {
        self.evaluations = self.evaluations.saturating_add(1);
        let report = EvaluationReport {
            zone_history: self.zone_history.evaluate(ctx, self.dispatcher.as_ref()),
            grid_data: self.grid.evaluate(ctx, &self.dispatcher),
            wind: self.wind.evaluate(ctx, &self.dispatcher),
            solar: self.solar.evaluate(ctx, &self.dispatcher),
        };
        if report.any() {
            self.logger.debug(&format!(
                "Evaluation {}: {:?}, {} live timer(s)",
                self.evaluations,
                report,
                self.active_timer_count()
            ));
        }
        report
    }

    /// Stop every timer. Nothing is dispatched.
    pub fn shutdown(&mut self) {
        self.zone_history.teardown();
        self.grid.teardown();
        self.wind.teardown();
        self.solar.teardown();
        self.logger.info("All polling sessions torn down");
    }

    /// Evaluate now, then on every input change until shutdown.
    ///
    /// Stops when `shutdown_rx` yields (or its sender is dropped) or when a
    /// provider goes away, and tears everything down on the way out.
    pub async fn run(
        &mut self,
        mut inputs: DashboardInputs,
        mut shutdown_rx: mpsc::UnboundedReceiver<()>,
    ) {
        self.logger.info("Starting fetch orchestrator");
        let ctx = inputs.current();
        self.evaluate(&ctx);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
                alive = inputs.changed() => {
                    if !alive {
                        self.logger.warn("Input provider closed, stopping orchestrator");
                        break;
                    }
                    let ctx = inputs.current();
                    self.evaluate(&ctx);
                }
            }
        }

        self.shutdown();
    }

    pub fn active_timer_count(&self) -> usize {
        [
            self.grid.is_polling(),
            self.wind.is_polling(),
            self.solar.is_polling(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn is_polling(&self, feed: FeedKind) -> bool {
        match feed {
            FeedKind::ZoneHistory => false,
            FeedKind::GridData => self.grid.is_polling(),
            FeedKind::Wind => self.wind.is_polling(),
            FeedKind::Solar => self.solar.is_polling(),
        }
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn zone_history(&self) -> &ZoneHistoryFetch {
        &self.zone_history
    }

    pub fn grid(&self) -> &GridDataPoller {
        &self.grid
    }

    pub fn wind(&self) -> &OverlayPoller {
        &self.wind
    }

    pub fn solar(&self) -> &OverlayPoller {
        &self.solar
    }
}
