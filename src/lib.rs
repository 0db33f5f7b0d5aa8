//! # Gridfeed - data-fetch orchestration for a live grid dashboard
//!
//! Decides, whenever a relevant input changes, whether to (re)issue a data
//! request, at what cadence to poll, and how to tear polling down again. Four
//! feeds are handled independently: zone history, aggregate grid data, and the
//! wind and solar overlays.
//!
//! ## Architecture
//!
//! - `config`: YAML configuration and validation
//! - `logging`: tracing setup and component loggers
//! - `types`: feeds, aggregates, feature sets, requests
//! - `actions`: commands and the dispatcher boundary
//! - `store`: in-memory state store and reducer
//! - `context`: read-only providers and the per-evaluation context
//! - `session`: owned polling timers
//! - `orchestrator`: the four scheduling units and their run loop
//! - `format`: power, CO₂ and date formatting

pub mod actions;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod logging;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use actions::{Action, ActionDispatcher, SharedDispatcher};
pub use config::Config;
pub use context::{Capabilities, DashboardControls, DashboardInputs, FetchContext};
pub use error::{GridFeedError, Result};
pub use orchestrator::FetchOrchestrator;
pub use store::{AppState, StateStore};
pub use types::{FeatureSet, FeedKind, FeedRequest, HistoryEntry, TimeAggregate};
