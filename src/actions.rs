//! Commands sent to the action dispatcher
//!
//! The orchestrator never talks to transport directly. Everything it wants
//! done is expressed as an [`Action`] and handed to an [`ActionDispatcher`];
//! whatever sits behind the dispatcher (the store reducer, a transport
//! bridge) updates state asynchronously.

use crate::types::{FeedKind, FeedRequest, TimeAggregate};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Result of a fetch, or an explicit invalidation when `payload` is `None`
#[derive(Debug, Clone, PartialEq)]
pub struct FeedResult {
    pub feed: FeedKind,
    pub zone_id: Option<String>,
    pub payload: Option<Value>,
}

/// Commands accepted by the state store
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `*_FETCH_REQUESTED`
    FetchRequested(FeedRequest),
    /// `*_FETCH_SUCCEEDED`
    FetchSucceeded(FeedResult),
    /// User picked a different time aggregate
    SetTimeAggregate(TimeAggregate),
}

impl Action {
    pub fn fetch(request: FeedRequest) -> Self {
        Action::FetchRequested(request)
    }

    /// Succeeded-with-null: clears whatever is cached for `feed`
    pub fn invalidate(feed: FeedKind) -> Self {
        Action::FetchSucceeded(FeedResult {
            feed,
            zone_id: None,
            payload: None,
        })
    }

    pub fn succeeded(feed: FeedKind, zone_id: Option<String>, payload: Value) -> Self {
        Action::FetchSucceeded(FeedResult {
            feed,
            zone_id,
            payload: Some(payload),
        })
    }

    /// Command name as seen by reducers and logs
    pub fn action_type(&self) -> &'static str {
        match self {
            Action::FetchRequested(req) => match req.feed {
                FeedKind::ZoneHistory => "ZONE_HISTORY_FETCH_REQUESTED",
                FeedKind::GridData => "GRID_DATA_FETCH_REQUESTED",
                FeedKind::Wind => "WIND_DATA_FETCH_REQUESTED",
                FeedKind::Solar => "SOLAR_DATA_FETCH_REQUESTED",
            },
            Action::FetchSucceeded(res) => match res.feed {
                FeedKind::ZoneHistory => "ZONE_HISTORY_FETCH_SUCCEEDED",
                FeedKind::GridData => "GRID_DATA_FETCH_SUCCEEDED",
                FeedKind::Wind => "WIND_DATA_FETCH_SUCCEEDED",
                FeedKind::Solar => "SOLAR_DATA_FETCH_SUCCEEDED",
            },
            Action::SetTimeAggregate(_) => "TIME_AGGREGATE_SELECTED",
        }
    }

    pub fn is_fetch_request_for(&self, feed: FeedKind) -> bool {
        matches!(self, Action::FetchRequested(req) if req.feed == feed)
    }

    pub fn is_invalidate_for(&self, feed: FeedKind) -> bool {
        matches!(self, Action::FetchSucceeded(res) if res.feed == feed && res.payload.is_none())
    }

    pub fn request(&self) -> Option<&FeedRequest> {
        match self {
            Action::FetchRequested(req) => Some(req),
            _ => None,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ZonePayload<'a> {
    zone_id: &'a str,
    data: &'a Option<Value>,
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.action_type())?;
        match self {
            Action::FetchRequested(req) => {
                if !req.is_bare() {
                    map.serialize_entry("payload", req)?;
                }
            }
            Action::FetchSucceeded(res) => match res.zone_id.as_deref() {
                Some(zone_id) => map.serialize_entry(
                    "payload",
                    &ZonePayload {
                        zone_id,
                        data: &res.payload,
                    },
                )?,
                None => map.serialize_entry("payload", &res.payload)?,
            },
            Action::SetTimeAggregate(aggregate) => map.serialize_entry("payload", aggregate)?,
        }
        map.end()
    }
}

/// Single channel through which actions leave the orchestrator
///
/// `dispatch` must not block: it is called from re-evaluations and from timer
/// ticks alike.
pub trait ActionDispatcher: Send + Sync {
    fn dispatch(&self, action: Action);
}

pub type SharedDispatcher = Arc<dyn ActionDispatcher>;

impl ActionDispatcher for mpsc::UnboundedSender<Action> {
    fn dispatch(&self, action: Action) {
        if let Err(e) = self.send(action) {
            warn!("Dropping {}: action receiver closed", e.0.action_type());
        }
    }
}

/// Dispatcher backed by an unbounded channel, plus its receiving end
pub fn channel() -> (SharedDispatcher, mpsc::UnboundedReceiver<Action>) {
    let (tx, rx) = mpsc::unbounded_channel::<Action>();
    (Arc::new(tx), rx)
}
