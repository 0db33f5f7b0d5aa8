//! Explicit inputs for orchestrator re-evaluation
//!
//! The selected zone, capability toggles and time override are read-only
//! providers owned elsewhere. They are modelled as `watch` channels: the UI
//! side holds a [`DashboardControls`], the orchestrator holds the matching
//! [`DashboardInputs`] and folds everything into one [`FetchContext`] per
//! evaluation.

use crate::config::DashboardConfig;
use crate::store::{AppState, StateStore};
use crate::types::{FeatureSet, FeedKind, HistoryEntry, TimeAggregate};
use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// Current capability flags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub features: FeatureSet,
    pub wind_enabled: bool,
    pub solar_enabled: bool,
}

impl Capabilities {
    /// Capability flag gating an overlay feed; other feeds are always on
    pub fn feed_enabled(&self, feed: FeedKind) -> bool {
        match feed {
            FeedKind::Wind => self.wind_enabled,
            FeedKind::Solar => self.solar_enabled,
            FeedKind::ZoneHistory | FeedKind::GridData => true,
        }
    }
}

/// Everything a scheduling unit may read during one evaluation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchContext {
    pub zone_id: Option<String>,
    /// Cached history for `zone_id`; `None` when no zone is selected
    pub zone_history: Option<Vec<HistoryEntry>>,
    pub custom_datetime: Option<DateTime<Utc>>,
    pub capabilities: Capabilities,
    pub selected_time_aggregate: TimeAggregate,
}

impl FetchContext {
    pub fn from_sources(
        zone_id: Option<String>,
        capabilities: Capabilities,
        custom_datetime: Option<DateTime<Utc>>,
        state: &AppState,
    ) -> Self {
        let zone_history = zone_id.as_deref().map(|zone| {
            state
                .zone_history(zone)
                .map(<[HistoryEntry]>::to_vec)
                .unwrap_or_default()
        });
        Self {
            zone_id,
            zone_history,
            custom_datetime,
            capabilities,
            selected_time_aggregate: state.selected_time_aggregate,
        }
    }

    pub fn features(&self) -> &FeatureSet {
        &self.capabilities.features
    }
}

/// Writing side of the providers
#[derive(Debug)]
pub struct DashboardControls {
    zone: watch::Sender<Option<String>>,
    capabilities: watch::Sender<Capabilities>,
    time_override: watch::Sender<Option<DateTime<Utc>>>,
}

impl DashboardControls {
    pub fn select_zone(&self, zone_id: Option<String>) {
        self.zone.send_if_modified(|current| replace_if_different(current, zone_id));
    }

    pub fn set_time_override(&self, datetime: Option<DateTime<Utc>>) {
        self.time_override
            .send_if_modified(|current| replace_if_different(current, datetime));
    }

    pub fn set_features(&self, features: FeatureSet) {
        self.capabilities
            .send_if_modified(|caps| replace_if_different(&mut caps.features, features));
    }

    pub fn set_wind_enabled(&self, enabled: bool) {
        self.capabilities
            .send_if_modified(|caps| replace_if_different(&mut caps.wind_enabled, enabled));
    }

    pub fn set_solar_enabled(&self, enabled: bool) {
        self.capabilities
            .send_if_modified(|caps| replace_if_different(&mut caps.solar_enabled, enabled));
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities.borrow().clone()
    }
}

fn replace_if_different<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Reading side of the providers plus the store subscription
#[derive(Debug)]
pub struct DashboardInputs {
    zone: watch::Receiver<Option<String>>,
    capabilities: watch::Receiver<Capabilities>,
    time_override: watch::Receiver<Option<DateTime<Utc>>>,
    store: watch::Receiver<AppState>,
}

impl DashboardInputs {
    /// Build the current context and mark every input as seen
    pub fn current(&mut self) -> FetchContext {
        let zone_id = self.zone.borrow_and_update().clone();
        let capabilities = self.capabilities.borrow_and_update().clone();
        let custom_datetime = *self.time_override.borrow_and_update();
        let state = self.store.borrow_and_update();
        FetchContext::from_sources(zone_id, capabilities, custom_datetime, &state)
    }

    /// Wait until any input changes. Returns `false` once a provider is gone.
    pub async fn changed(&mut self) -> bool {
        let result = tokio::select! {
            r = self.zone.changed() => r,
            r = self.capabilities.changed() => r,
            r = self.time_override.changed() => r,
            r = self.store.changed() => r,
        };
        result.is_ok()
    }
}

/// Create both provider halves, seeded from configuration
pub fn dashboard_channels(
    initial: &DashboardConfig,
    store: &StateStore,
) -> (DashboardControls, DashboardInputs) {
    let capabilities = Capabilities {
        features: initial.features.iter().map(String::as_str).collect(),
        wind_enabled: initial.wind_enabled,
        solar_enabled: initial.solar_enabled,
    };
    let (zone_tx, zone_rx) = watch::channel(initial.zone_id.clone());
    let (caps_tx, caps_rx) = watch::channel(capabilities);
    let (override_tx, override_rx) = watch::channel(initial.custom_datetime);

    let controls = DashboardControls {
        zone: zone_tx,
        capabilities: caps_tx,
        time_override: override_tx,
    };
    let inputs = DashboardInputs {
        zone: zone_rx,
        capabilities: caps_rx,
        time_override: override_rx,
        store: store.subscribe(),
    };
    (controls, inputs)
}
