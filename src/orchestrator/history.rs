//! Zone history conditional fetch
//!
//! Makes sure the history of the viewed zone is cached, detailed, and computed
//! for the selected time aggregate. No timer: one evaluation dispatches at
//! most one request, and an evaluation over a satisfying cache does nothing.

use super::tracked::Tracked;
use crate::actions::{Action, ActionDispatcher};
use crate::context::FetchContext;
use crate::logging::{StructuredLogger, get_logger};
use crate::types::{FeatureSet, FeedRequest, HISTORY_FEATURE, HistoryEntry, TimeAggregate};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
struct HistoryDeps {
    zone_id: Option<String>,
    zone_history: Option<Vec<HistoryEntry>>,
    custom_datetime: Option<DateTime<Utc>>,
    features: FeatureSet,
    selected_time_aggregate: TimeAggregate,
}

impl HistoryDeps {
    fn read(ctx: &FetchContext) -> Self {
        Self {
            zone_id: ctx.zone_id.clone(),
            zone_history: ctx.zone_history.clone(),
            custom_datetime: ctx.custom_datetime,
            features: ctx.features().clone(),
            selected_time_aggregate: ctx.selected_time_aggregate,
        }
    }
}

/// Whether cached history must be fetched again.
///
/// The aggregate only matters with the `history` feature on. A missing first
/// entry counts as neither detailed nor correctly aggregated.
pub fn needs_refetch(
    history: Option<&[HistoryEntry]>,
    features: &FeatureSet,
    selected_time_aggregate: TimeAggregate,
) -> bool {
    let first = history.and_then(<[HistoryEntry]>::first);

    let has_correct_time_aggregate = !features.contains(HISTORY_FEATURE)
        || first.and_then(|entry| entry.aggregation) == Some(selected_time_aggregate);

    let has_detailed_history = first.is_some_and(|entry| entry.has_detailed_data != Some(false));

    !has_detailed_history || !has_correct_time_aggregate
}

/// Decide on a request for the current context, logging diagnostics on the way
pub fn history_fetch_request(ctx: &FetchContext, logger: &StructuredLogger) -> Option<FeedRequest> {
    if ctx.custom_datetime.is_some() {
        logger.error("Can't fetch history when a custom date is provided!");
        return None;
    }

    let zone_id = ctx.zone_id.as_deref()?;
    let history = ctx.zone_history.as_deref();
    if history.is_some_and(<[HistoryEntry]>::is_empty) {
        logger.error(&format!("No history data available right now for {}!", zone_id));
    }

    needs_refetch(history, ctx.features(), ctx.selected_time_aggregate).then(|| {
        FeedRequest::zone_history(
            zone_id,
            ctx.features().clone(),
            ctx.selected_time_aggregate,
        )
    })
}

/// Scheduling unit for [`crate::types::FeedKind::ZoneHistory`]
#[derive(Debug)]
pub struct ZoneHistoryFetch {
    deps: Tracked<HistoryDeps>,
    logger: StructuredLogger,
}

impl ZoneHistoryFetch {
    pub fn new() -> Self {
        Self {
            deps: Tracked::new(),
            logger: get_logger("zone_history"),
        }
    }

    /// Re-evaluate if any dependency changed. Returns whether a request was sent.
    pub fn evaluate(&mut self, ctx: &FetchContext, dispatcher: &dyn ActionDispatcher) -> bool {
        if !self.deps.update(HistoryDeps::read(ctx)) {
            return false;
        }
        match history_fetch_request(ctx, &self.logger) {
            Some(request) => {
                self.logger.debug(&format!(
                    "Requesting {} history for {}",
                    ctx.selected_time_aggregate,
                    request.zone_id.as_deref().unwrap_or_default()
                ));
                dispatcher.dispatch(Action::fetch(request));
                true
            }
            None => false,
        }
    }

    /// Forget tracked inputs; nothing else to release
    pub fn teardown(&mut self) {
        self.deps.reset();
    }

    pub fn evaluations(&self) -> u64 {
        self.deps.runs()
    }
}

impl Default for ZoneHistoryFetch {
    fn default() -> Self {
        Self::new()
    }
}
