//! Grid data poller
//!
//! Every evaluation tears down the running timer, dispatches one request right
//! away and, unless a time override pins the request, starts a new timer that
//! repeats the identical request every fetch interval.

use super::tracked::Tracked;
use crate::actions::{Action, SharedDispatcher};
use crate::context::FetchContext;
use crate::logging::{StructuredLogger, get_logger};
use crate::session::PollingSession;
use crate::types::{FeatureSet, FeedKind, FeedRequest, TimeAggregate};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct GridDeps {
    datetime: Option<DateTime<Utc>>,
    features: FeatureSet,
    selected_time_aggregate: TimeAggregate,
}

#[derive(Debug)]
pub struct GridDataPoller {
    deps: Tracked<GridDeps>,
    session: PollingSession,
    interval: Duration,
    logger: StructuredLogger,
}

impl GridDataPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            deps: Tracked::new(),
            session: PollingSession::new(FeedKind::GridData),
            interval,
            logger: get_logger("grid_poller"),
        }
    }

    /// Re-evaluate if the override, features or aggregate changed
    pub fn evaluate(&mut self, ctx: &FetchContext, dispatcher: &SharedDispatcher) -> bool {
        let deps = GridDeps {
            datetime: ctx.custom_datetime,
            features: ctx.features().clone(),
            selected_time_aggregate: ctx.selected_time_aggregate,
        };
        if !self.deps.update(deps) {
            return false;
        }

        self.session.stop();

        let request = FeedRequest::grid_data(
            ctx.custom_datetime,
            ctx.features().clone(),
            ctx.selected_time_aggregate,
        );
        dispatcher.dispatch(Action::fetch(request.clone()));

        if ctx.custom_datetime.is_some() {
            self.logger
                .debug("Custom datetime set, grid data fetched once without polling");
        } else {
            let dispatcher = Arc::clone(dispatcher);
            self.session.start(self.interval, move || {
                dispatcher.dispatch(Action::fetch(request.clone()));
            });
        }
        true
    }

    /// Stop polling without dispatching anything
    pub fn teardown(&mut self) {
        self.session.stop();
        self.deps.reset();
    }

    pub fn session(&self) -> &PollingSession {
        &self.session
    }

    pub fn is_polling(&self) -> bool {
        self.session.is_active()
    }
}
