//! Event Bus implementation.
//!
//! Each viewer owns an `Arc<EventBus>`, so independent sessions (and tests)
//! never see each other's events. Publishing with nobody listening is
//! normal: the viewer core runs headless as often as not.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Which events a subscriber receives.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Events of any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type Handler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

/// Event bus settings.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Capacity of the tokio broadcast channel.
    pub channel_capacity: usize,
    /// Number of recent events kept for late joiners; 0 disables the journal.
    pub journal_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            journal_size: 64,
        }
    }
}

/// A journaled event with its publish sequence number and time.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub seq: u64,
    pub published_at: DateTime<Utc>,
    pub event: AppEvent,
}

#[derive(Default)]
struct Journal {
    next_seq: u64,
    entries: VecDeque<JournalEntry>,
}

/// Publish/subscribe hub for status, mode, query, layer and analysis events.
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    subscribers: RwLock<Vec<Subscriber>>,
    journal: Mutex<Journal>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            subscribers: RwLock::new(Vec::new()),
            journal: Mutex::new(Journal::default()),
            config,
        }
    }

    /// Delivers `event` to matching handlers, then to broadcast receivers.
    ///
    /// Handlers run on the publishing thread, in subscription order, outside
    /// the subscriber lock so they may subscribe or unsubscribe themselves.
    /// Returns the number of deliveries.
    pub fn publish(&self, event: AppEvent) -> usize {
        tracing::trace!("event: {}", event.description());
        self.record(&event);

        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| s.handler.clone())
            .collect();
        for handler in &handlers {
            handler(&event);
        }

        handlers.len() + self.sender.send(event).unwrap_or(0)
    }

    /// Registers a synchronous handler. It must return quickly.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.write().push(Subscriber {
            id,
            filter,
            handler: Arc::new(handler),
        });
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        before != subscribers.len()
    }

    /// Receiver for consuming events from a tokio task.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Journaled events published after `after` (all when `None`), oldest first.
    pub fn journal(&self, after: Option<u64>) -> Vec<JournalEntry> {
        self.journal
            .lock()
            .entries
            .iter()
            .filter(|e| after.is_none_or(|seq| e.seq > seq))
            .cloned()
            .collect()
    }

    /// Journaled events published at or after `since`, oldest first.
    pub fn journal_since(&self, since: DateTime<Utc>) -> Vec<JournalEntry> {
        self.journal
            .lock()
            .entries
            .iter()
            .filter(|e| e.published_at >= since)
            .cloned()
            .collect()
    }

    /// Most recent journaled event of `category`.
    pub fn last(&self, category: EventCategory) -> Option<AppEvent> {
        self.journal
            .lock()
            .entries
            .iter()
            .rev()
            .find(|e| e.event.category() == category)
            .map(|e| e.event.clone())
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn record(&self, event: &AppEvent) {
        if self.config.journal_size == 0 {
            return;
        }
        let mut journal = self.journal.lock();
        let seq = journal.next_seq;
        journal.next_seq += 1;
        journal.entries.push_back(JournalEntry {
            seq,
            published_at: Utc::now(),
            event: event.clone(),
        });
        while journal.entries.len() > self.config.journal_size {
            journal.entries.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{ModeEvent, QueryEvent, StatusEvent, StatusLevel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn toast(text: &str) -> AppEvent {
        AppEvent::Status(StatusEvent::Toast {
            text: text.to_string(),
            level: StatusLevel::Info,
        })
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.publish(toast("nobody")), 0);
    }

    #[test]
    fn test_category_filter() {
        let bus = EventBus::new();
        let status = Arc::new(AtomicUsize::new(0));
        let counter = status.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Status]),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        assert_eq!(bus.publish(toast("ready")), 1);
        assert_eq!(
            bus.publish(AppEvent::Mode(ModeEvent::Deactivated {
                mode: "QueryBox".to_string(),
            })),
            0
        );
        bus.publish(AppEvent::Query(QueryEvent::PointMiss));
        assert_eq!(status.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let bus = Arc::new(EventBus::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));
        let (b, s) = (Arc::downgrade(&bus), slot.clone());
        let id = bus.subscribe(EventFilter::All, move |_| {
            if let (Some(bus), Some(id)) = (b.upgrade(), *s.lock()) {
                bus.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        assert_eq!(bus.publish(toast("once")), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_journal_is_bounded() {
        let bus = EventBus::with_config(EventBusConfig {
            journal_size: 3,
            ..Default::default()
        });
        for i in 0..6 {
            bus.publish(toast(&format!("message {}", i)));
        }
        bus.publish(AppEvent::Query(QueryEvent::PointMiss));

        let journal = bus.journal(None);
        assert_eq!(journal.len(), 3);
        assert_eq!(journal[0].seq, 4);
        assert_eq!(bus.journal(Some(5)).len(), 1);
        assert_eq!(bus.last(EventCategory::Status), Some(toast("message 5")));
        assert_eq!(bus.last(EventCategory::Mode), None);
    }

    #[test]
    fn test_journal_since() {
        let bus = EventBus::new();
        let start = Utc::now();
        bus.publish(toast("first"));
        bus.publish(toast("second"));

        let entries = bus.journal_since(start);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].published_at <= entries[1].published_at);
        assert!(bus
            .journal_since(Utc::now() + chrono::Duration::seconds(60))
            .is_empty());
    }

    #[test]
    fn test_journal_disabled() {
        let bus = EventBus::with_config(EventBusConfig {
            journal_size: 0,
            ..Default::default()
        });
        bus.publish(toast("gone"));
        assert!(bus.journal(None).is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        bus.publish(AppEvent::Query(QueryEvent::BoxCompleted { total: 2, layers: 1 }));

        match receiver.recv().await {
            Ok(AppEvent::Query(QueryEvent::BoxCompleted { total, layers })) => {
                assert_eq!((total, layers), (2, 1));
            }
            other => panic!("Wrong event received: {:?}", other),
        }
    }
}
