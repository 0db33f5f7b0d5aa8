//! Shared domain types: feeds, time aggregates, feature sets and requests

use crate::error::{GridFeedError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Feature flag that makes the history fetch honour the selected aggregate
pub const HISTORY_FEATURE: &str = "history";

/// The four independent data categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    ZoneHistory,
    GridData,
    Wind,
    Solar,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::ZoneHistory => "zone_history",
            FeedKind::GridData => "grid_data",
            FeedKind::Wind => "wind",
            FeedKind::Solar => "solar",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Granularity at which history and time-series data is bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeAggregate {
    #[default]
    Hourly,
    Daily,
    Monthly,
    Yearly,
}

impl TimeAggregate {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeAggregate::Hourly => "hourly",
            TimeAggregate::Daily => "daily",
            TimeAggregate::Monthly => "monthly",
            TimeAggregate::Yearly => "yearly",
        }
    }
}

impl fmt::Display for TimeAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeAggregate {
    type Err = GridFeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Ok(TimeAggregate::Hourly),
            "daily" => Ok(TimeAggregate::Daily),
            "monthly" => Ok(TimeAggregate::Monthly),
            "yearly" => Ok(TimeAggregate::Yearly),
            _ => Err(GridFeedError::validation(
                "time_aggregate",
                format!("{} is not implemented", s),
            )),
        }
    }
}

/// Set of enabled feature flags
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeSet<String>);

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.0.contains(feature)
    }

    pub fn insert<S: Into<String>>(&mut self, feature: S) -> bool {
        self.0.insert(feature.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Cached history point, as far as the fetch gate cares about it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryEntry {
    /// Aggregate the cached data was computed for
    pub aggregation: Option<TimeAggregate>,
    /// `None` means unknown and is treated as detailed
    pub has_detailed_data: Option<bool>,
}

impl HistoryEntry {
    pub fn new(aggregation: TimeAggregate, has_detailed_data: Option<bool>) -> Self {
        Self {
            aggregation: Some(aggregation),
            has_detailed_data,
        }
    }
}

/// Payload of a fetch command sent to the dispatcher
///
/// `datetime` is only ever set while a fixed time override is active, and a
/// request carrying one is never re-dispatched by a timer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    #[serde(skip)]
    pub feed: FeedKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_time_aggregate: Option<TimeAggregate>,
}

impl FeedRequest {
    pub fn zone_history<S: Into<String>>(
        zone_id: S,
        features: FeatureSet,
        selected_time_aggregate: TimeAggregate,
    ) -> Self {
        Self {
            feed: FeedKind::ZoneHistory,
            zone_id: Some(zone_id.into()),
            datetime: None,
            features: Some(features),
            selected_time_aggregate: Some(selected_time_aggregate),
        }
    }

    pub fn grid_data(
        datetime: Option<DateTime<Utc>>,
        features: FeatureSet,
        selected_time_aggregate: TimeAggregate,
    ) -> Self {
        Self {
            feed: FeedKind::GridData,
            zone_id: None,
            datetime,
            features: Some(features),
            selected_time_aggregate: Some(selected_time_aggregate),
        }
    }

    /// Wind or solar request; live requests carry no fields at all
    pub fn overlay(feed: FeedKind, datetime: Option<DateTime<Utc>>) -> Self {
        Self {
            feed,
            zone_id: None,
            datetime,
            features: None,
            selected_time_aggregate: None,
        }
    }

    /// True when the request has no payload fields
    pub fn is_bare(&self) -> bool {
        self.zone_id.is_none()
            && self.datetime.is_none()
            && self.features.is_none()
            && self.selected_time_aggregate.is_none()
    }
}
