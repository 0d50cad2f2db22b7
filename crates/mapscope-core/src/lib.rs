//! # MapScope Core
//!
//! Core types shared by every MapScope crate: the error taxonomy, the
//! application event bus the status presenter publishes through, and
//! length/area formatting for measurement labels.

pub mod error;
pub mod event_bus;
pub mod units;

pub use error::{Error, GeometryError, NotReadyError, Result, ServiceError, ValidationError};

pub use event_bus::{
    AnalysisEvent, AppEvent, EventBus, EventBusConfig, EventCategory, EventFilter, JournalEntry,
    LayerEvent, ModeEvent, QueryEvent, StatusEvent, StatusLevel, SubscriptionId,
};
