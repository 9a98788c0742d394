//! Player event bus
//!
//! Fire-and-forget notifications with synchronous dispatch. Unlike hooks,
//! events carry no verdict: every current subscriber is called, in
//! subscription order.

use crate::lock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tracing::trace;

/// Named player events
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerEvent {
    Play,
    Pause,
    Seek,
    Ended,
    TimeUpdate,
    VolumeChange,
    RateChange,
    PartChange,
    Loop,
    LoopOff,
    Fullscreen,
    FullscreenOff,
    Webfull,
    WebfullOff,
    Pip,
    PipOff,
    #[serde(rename = "fixedcontroller")]
    FixedController,
    #[serde(rename = "fixedcontroller_off")]
    FixedControllerOff,
    ThemeChange,
    /// Key pressed while the player has focus
    Keydown,
    Destroy,
    /// Plugin-defined event
    Custom(String),
}

impl PlayerEvent {
    /// Every named event
    pub const BUILTIN: [PlayerEvent; 21] = [
        PlayerEvent::Play,
        PlayerEvent::Pause,
        PlayerEvent::Seek,
        PlayerEvent::Ended,
        PlayerEvent::TimeUpdate,
        PlayerEvent::VolumeChange,
        PlayerEvent::RateChange,
        PlayerEvent::PartChange,
        PlayerEvent::Loop,
        PlayerEvent::LoopOff,
        PlayerEvent::Fullscreen,
        PlayerEvent::FullscreenOff,
        PlayerEvent::Webfull,
        PlayerEvent::WebfullOff,
        PlayerEvent::Pip,
        PlayerEvent::PipOff,
        PlayerEvent::FixedController,
        PlayerEvent::FixedControllerOff,
        PlayerEvent::ThemeChange,
        PlayerEvent::Keydown,
        PlayerEvent::Destroy,
    ];

    /// Wire name of the event
    pub fn as_str(&self) -> &str {
        match self {
            PlayerEvent::Play => "play",
            PlayerEvent::Pause => "pause",
            PlayerEvent::Seek => "seek",
            PlayerEvent::Ended => "ended",
            PlayerEvent::TimeUpdate => "time_update",
            PlayerEvent::VolumeChange => "volume_change",
            PlayerEvent::RateChange => "rate_change",
            PlayerEvent::PartChange => "part_change",
            PlayerEvent::Loop => "loop",
            PlayerEvent::LoopOff => "loop_off",
            PlayerEvent::Fullscreen => "fullscreen",
            PlayerEvent::FullscreenOff => "fullscreen_off",
            PlayerEvent::Webfull => "webfull",
            PlayerEvent::WebfullOff => "webfull_off",
            PlayerEvent::Pip => "pip",
            PlayerEvent::PipOff => "pip_off",
            PlayerEvent::FixedController => "fixedcontroller",
            PlayerEvent::FixedControllerOff => "fixedcontroller_off",
            PlayerEvent::ThemeChange => "theme_change",
            PlayerEvent::Keydown => "keydown",
            PlayerEvent::Destroy => "destroy",
            PlayerEvent::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Data attached to a triggered event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EventPayload {
    None,
    Part(usize),
    Time(f64),
    Volume(f64),
    Rate(f64),
    Color(String),
    /// Key name, as in `KeyboardEvent.key`
    Key(String),
    Data(serde_json::Value),
}

/// Subscriber callback. The returned `Arc` from [`EventBus::on`] is the
/// identity used by [`EventBus::off`].
pub type EventHandler = Arc<dyn Fn(&EventPayload) + Send + Sync>;

type Subscribers = HashMap<PlayerEvent, Vec<EventHandler>>;

/// Synchronous event bus owned by one player
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Subscribers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to an event, returning the handler for later removal
    pub fn on<F>(&self, event: PlayerEvent, handler: F) -> EventHandler
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        self.subscribe(event, handler.clone());
        handler
    }

    /// Subscribe an existing handler
    pub fn subscribe(&self, event: PlayerEvent, handler: EventHandler) {
        lock(&self.inner).entry(event).or_default().push(handler);
    }

    /// Remove a handler by identity. Unknown handlers are ignored.
    pub fn off(&self, event: &PlayerEvent, handler: &EventHandler) {
        let mut subscribers = lock(&self.inner);
        if let Some(list) = subscribers.get_mut(event) {
            if let Some(index) = list.iter().position(|h| Arc::ptr_eq(h, handler)) {
                list.remove(index);
            }
        }
    }

    /// Dispatch an event to every current subscriber
    pub fn trigger(&self, event: PlayerEvent, payload: EventPayload) {
        // Snapshot so handlers can subscribe or trigger while we dispatch
        let handlers = lock(&self.inner).get(&event).cloned().unwrap_or_default();
        trace!(event = %event, subscribers = handlers.len(), "Event triggered");
        for handler in handlers {
            handler(&payload);
        }
    }

    /// Number of subscribers for an event
    pub fn listener_count(&self, event: &PlayerEvent) -> usize {
        lock(&self.inner).get(event).map(Vec::len).unwrap_or(0)
    }

    /// Drop every subscription
    pub fn clear(&self) {
        lock(&self.inner).clear();
    }

    /// Non-owning handle to this bus
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events = lock(&self.inner).len();
        f.debug_struct("EventBus").field("events", &events).finish()
    }
}

/// Weak reference to an [`EventBus`], held by objects the bus may own
#[derive(Debug, Clone, Default)]
pub struct WeakEventBus {
    inner: Weak<Mutex<Subscribers>>,
}

impl WeakEventBus {
    pub fn upgrade(&self) -> Option<EventBus> {
        self.inner.upgrade().map(|inner| EventBus { inner })
    }

    /// Trigger through the bus if it is still alive
    pub fn trigger(&self, event: PlayerEvent, payload: EventPayload) {
        if let Some(bus) = self.upgrade() {
            bus.trigger(event, payload);
        }
    }
}
