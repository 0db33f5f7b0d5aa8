//! In-memory state store
//!
//! Holds the last payload per feed and the selected time aggregate. State is
//! readable synchronously via [`StateStore::snapshot`] and only mutated by
//! applying [`Action`]s. Every effective change is published on a `watch`
//! channel, which is what closes the loop back into the orchestrator.

use crate::actions::{Action, FeedResult};
use crate::logging::{StructuredLogger, get_logger};
use crate::types::{FeedKind, HistoryEntry, TimeAggregate};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::{mpsc, watch};

/// Snapshot of everything the dashboard has fetched so far
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    pub selected_time_aggregate: TimeAggregate,
    pub histories: HashMap<String, Vec<HistoryEntry>>,
    pub grid: Option<Value>,
    pub wind: Option<Value>,
    pub solar: Option<Value>,
    /// Feeds with a request in flight
    pub fetching: BTreeSet<FeedKind>,
}

impl AppState {
    pub fn zone_history(&self, zone_id: &str) -> Option<&[HistoryEntry]> {
        self.histories.get(zone_id).map(Vec::as_slice)
    }

    pub fn is_fetching(&self, feed: FeedKind) -> bool {
        self.fetching.contains(&feed)
    }

    /// Reduce one action into the state. Returns whether anything changed.
    pub fn apply(&mut self, action: &Action, logger: &StructuredLogger) -> bool {
        match action {
            Action::FetchRequested(req) => self.fetching.insert(req.feed),
            Action::FetchSucceeded(result) => {
                let was_fetching = self.fetching.remove(&result.feed);
                self.store_result(result, logger) || was_fetching
            }
            Action::SetTimeAggregate(aggregate) => {
                if self.selected_time_aggregate == *aggregate {
                    false
                } else {
                    self.selected_time_aggregate = *aggregate;
                    true
                }
            }
        }
    }

    fn store_result(&mut self, result: &FeedResult, logger: &StructuredLogger) -> bool {
        let slot = match result.feed {
            FeedKind::GridData => &mut self.grid,
            FeedKind::Wind => &mut self.wind,
            FeedKind::Solar => &mut self.solar,
            FeedKind::ZoneHistory => return self.store_history(result, logger),
        };
        if *slot == result.payload {
            return false;
        }
        slot.clone_from(&result.payload);
        true
    }

    fn store_history(&mut self, result: &FeedResult, logger: &StructuredLogger) -> bool {
        let Some(zone_id) = result.zone_id.as_deref() else {
            logger.warn("Zone history result without a zone id ignored");
            return false;
        };
        let Some(payload) = result.payload.as_ref() else {
            return self.histories.remove(zone_id).is_some();
        };
        match serde_json::from_value::<Vec<HistoryEntry>>(payload.clone()) {
            Ok(entries) => {
                if self.histories.get(zone_id) == Some(&entries) {
                    return false;
                }
                self.histories.insert(zone_id.to_string(), entries);
                true
            }
            Err(e) => {
                logger.warn(&format!(
                    "Discarding undecodable history for {}: {}",
                    zone_id, e
                ));
                false
            }
        }
    }
}

/// Shared store; clone the receiver side via [`StateStore::subscribe`]
pub struct StateStore {
    state: watch::Sender<AppState>,
    logger: StructuredLogger,
}

impl StateStore {
    pub fn new(initial: AppState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            logger: get_logger("store"),
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Apply an action; subscribers are only woken when the state changed
    pub fn apply(&self, action: &Action) -> bool {
        let logger = &self.logger;
        let changed = self
            .state
            .send_if_modified(|state| state.apply(action, logger));
        if changed {
            logger.trace(&format!("{} applied", action.action_type()));
        }
        changed
    }

    /// Drain actions until every sender is gone
    pub async fn run(&self, mut actions: mpsc::UnboundedReceiver<Action>) {
        self.logger.info("State store started");
        while let Some(action) = actions.recv().await {
            self.apply(&action);
        }
        self.logger.info("Action channel closed, state store stopped");
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureSet, FeedRequest};
    use serde_json::json;

    #[test]
    fn repeated_request_does_not_notify() {
        let store = StateStore::default();
        let mut rx = store.subscribe();
        let req = Action::fetch(FeedRequest::grid_data(
            None,
            FeatureSet::new(),
            TimeAggregate::Hourly,
        ));
        assert!(store.apply(&req));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!store.apply(&req));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn invalid_history_payload_is_ignored() {
        let store = StateStore::default();
        let action = Action::succeeded(
            FeedKind::ZoneHistory,
            Some("FR".to_string()),
            json!({"not": "a list"}),
        );
        assert!(!store.apply(&action));
        assert!(store.snapshot().zone_history("FR").is_none());
    }
}
