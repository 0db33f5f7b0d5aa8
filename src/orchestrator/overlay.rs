//! Wind and solar overlay pollers
//!
//! One state machine, instantiated once per overlay feed:
//!
//! ```text
//!   Disabled  ── flag on, no override ──▶  Live    (fetch now + timer)
//!   Disabled  ── flag on, override    ──▶  Pinned  (single fetch with datetime)
//!   Live/Pinned ── flag off           ──▶  Disabled (invalidate cached payload)
//! ```
//!
//! Each transition stops the running timer before acting. Teardown only stops
//! the timer and never dispatches.

use super::tracked::Tracked;
use crate::actions::{Action, SharedDispatcher};
use crate::context::FetchContext;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::session::PollingSession;
use crate::types::{FeedKind, FeedRequest};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::Duration;

/// Where an overlay unit currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Not evaluated yet, or torn down
    Idle,
    /// Capability flag off
    Disabled,
    /// Flag on, pinned to a fixed datetime
    Pinned(DateTime<Utc>),
    /// Flag on, polling live data
    Live,
}

#[derive(Debug, Clone, PartialEq)]
struct OverlayDeps {
    enabled: bool,
    datetime: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct OverlayPoller {
    feed: FeedKind,
    deps: Tracked<OverlayDeps>,
    session: PollingSession,
    state: OverlayState,
    interval: Duration,
    logger: StructuredLogger,
}

impl OverlayPoller {
    pub fn new(feed: FeedKind, interval: Duration) -> Self {
        let context = LogContext::new("overlay_poller").with_field("feed", feed.to_string());
        Self {
            feed,
            deps: Tracked::new(),
            session: PollingSession::new(feed),
            state: OverlayState::Idle,
            interval,
            logger: get_logger_with_context(context),
        }
    }

    pub fn wind(interval: Duration) -> Self {
        Self::new(FeedKind::Wind, interval)
    }

    pub fn solar(interval: Duration) -> Self {
        Self::new(FeedKind::Solar, interval)
    }

    /// Re-evaluate if the capability flag or the override changed
    pub fn evaluate(&mut self, ctx: &FetchContext, dispatcher: &SharedDispatcher) -> bool {
        let deps = OverlayDeps {
            enabled: ctx.capabilities.feed_enabled(self.feed),
            datetime: ctx.custom_datetime,
        };
        if !self.deps.update(deps.clone()) {
            return false;
        }

        self.session.stop();

        self.state = match (deps.enabled, deps.datetime) {
            (false, _) => {
                self.logger.debug("Overlay disabled, invalidating cached data");
                dispatcher.dispatch(Action::invalidate(self.feed));
                OverlayState::Disabled
            }
            (true, Some(datetime)) => {
                dispatcher.dispatch(Action::fetch(FeedRequest::overlay(
                    self.feed,
                    Some(datetime),
                )));
                OverlayState::Pinned(datetime)
            }
            (true, None) => {
                let request = FeedRequest::overlay(self.feed, None);
                dispatcher.dispatch(Action::fetch(request.clone()));
                let dispatcher = Arc::clone(dispatcher);
                self.session.start(self.interval, move || {
                    dispatcher.dispatch(Action::fetch(request.clone()));
                });
                OverlayState::Live
            }
        };
        true
    }

    /// Stop polling without dispatching anything
    pub fn teardown(&mut self) {
        self.session.stop();
        self.deps.reset();
        self.state = OverlayState::Idle;
    }

    pub fn feed(&self) -> FeedKind {
        self.feed
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn session(&self) -> &PollingSession {
        &self.session
    }

    pub fn is_polling(&self) -> bool {
        self.session.is_active()
    }
}
