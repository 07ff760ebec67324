//! In-process event hub: synchronous publish/subscribe with field-equality
//! filters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use serde::Serialize;
use serde_json::{Map, Value};

pub const STAMPING_STATUS_EVENT: &str = "stamping-status";
pub const SHOW_DIALOG_EVENT: &str = "show-dialog";

/// A published event. `event_type` is also visible to filters as `eventType`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubEvent {
    pub event_type: String,
    pub payload: Map<String, Value>,
}

impl HubEvent {
    fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }
}

/// Matches events of one type whose payload fields equal the given values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub event_type: Option<String>,
    pub fields: HashMap<String, Value>,
}

impl EventFilter {
    pub fn event_type(event_type: &str) -> Self {
        Self {
            event_type: Some(event_type.to_string()),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn matches(&self, event: &HubEvent) -> bool {
        if let Some(event_type) = &self.event_type {
            if *event_type != event.event_type {
                return false;
            }
        }
        self.fields.iter().all(|(name, expected)| match name.as_str() {
            "eventType" => expected.as_str() == Some(event.event_type.as_str()),
            _ => event.field(name) == Some(expected),
        })
    }
}

pub type Listener = Arc<dyn Fn(&HubEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Publish/subscribe boundary used by the stamping session.
pub trait EventBus: Send + Sync {
    fn subscribe(&self, filter: EventFilter, listener: Listener) -> SubscriptionId;

    /// Removed after its first delivery.
    fn subscribe_once(&self, filter: EventFilter, listener: Listener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Delivers to every matching listener and returns how many got it.
    fn publish(&self, event_type: &str, payload: Value) -> usize;
}

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    listener: Listener,
    once: bool,
}

#[derive(Default)]
pub struct Hub {
    next_id: AtomicU64,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        match self.subscriptions.read() {
            Ok(subs) => subs.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Subscription>> {
        match self.subscriptions.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Event hub lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn add(&self, filter: EventFilter, listener: Listener, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.write().push(Subscription {
            id,
            filter,
            listener,
            once,
        });
        id
    }
}

impl EventBus for Hub {
    fn subscribe(&self, filter: EventFilter, listener: Listener) -> SubscriptionId {
        self.add(filter, listener, false)
    }

    fn subscribe_once(&self, filter: EventFilter, listener: Listener) -> SubscriptionId {
        self.add(filter, listener, true)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.write();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    fn publish(&self, event_type: &str, payload: Value) -> usize {
        let payload = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        let event = HubEvent {
            event_type: event_type.to_string(),
            payload,
        };

        // Listeners run outside the lock so they may publish or subscribe.
        let listeners: Vec<Listener> = {
            let mut subs = self.write();
            let matching: Vec<Listener> = subs
                .iter()
                .filter(|s| s.filter.matches(&event))
                .map(|s| Arc::clone(&s.listener))
                .collect();
            subs.retain(|s| !(s.once && s.filter.matches(&event)));
            matching
        };

        if listeners.is_empty() {
            log::warn!("No subscribers for event '{}'", event_type);
            return 0;
        }
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }
}
