//! # Event Bus Module
//!
//! Decoupled publish/subscribe channel between the viewer core and
//! whatever front end renders it:
//! - The core publishes typed events without knowing who listens
//! - Subscribers filter by category
//! - Synchronous handlers and tokio broadcast receivers are both supported
//! - A bounded journal lets a late front end catch up
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mapscope_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, StatusEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Status]),
//!     |event| {
//!         if let AppEvent::Status(StatusEvent::Toast { text, .. }) = event {
//!             println!("{}", text);
//!         }
//!     },
//! );
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
