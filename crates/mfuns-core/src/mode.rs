//! Presentation modes
//!
//! Fullscreen, webfull and picture-in-picture each have their own handler
//! with its own flag. Fullscreen and webfull exclude each other: the
//! coordinator listens for the enter event of one and exits the other.
//! Picture-in-picture is independent. Wide mode is not implemented and is
//! always inactive.

use crate::events::{EventBus, EventPayload, PlayerEvent, WeakEventBus};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Presentation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Fullscreen,
    Webfull,
    Pip,
    Wide,
}

impl Mode {
    /// Events emitted when the mode is entered and left
    pub fn events(&self) -> Option<(PlayerEvent, PlayerEvent)> {
        match self {
            Mode::Fullscreen => Some((PlayerEvent::Fullscreen, PlayerEvent::FullscreenOff)),
            Mode::Webfull => Some((PlayerEvent::Webfull, PlayerEvent::WebfullOff)),
            Mode::Pip => Some((PlayerEvent::Pip, PlayerEvent::PipOff)),
            Mode::Wide => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Fullscreen => write!(f, "fullscreen"),
            Mode::Webfull => write!(f, "webfull"),
            Mode::Pip => write!(f, "pip"),
            Mode::Wide => write!(f, "wide"),
        }
    }
}

/// Snapshot of every mode flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeState {
    pub fullscreen: bool,
    pub webfull: bool,
    pub pip: bool,
    pub wide: bool,
    pub fixed_controller: bool,
}

/// Owns the active flag of one mode
pub struct ModeHandler {
    mode: Mode,
    active: AtomicBool,
    events: WeakEventBus,
    on_change: Option<Box<dyn Fn(bool) + Send + Sync>>,
}

impl ModeHandler {
    fn new(mode: Mode, events: WeakEventBus) -> Self {
        Self {
            mode,
            active: AtomicBool::new(false),
            events,
            on_change: None,
        }
    }

    fn with_on_change(mut self, f: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Activate. Returns false if already active; no event is emitted then.
    pub fn enter(&self) -> bool {
        self.transition(true)
    }

    /// Deactivate. Returns false if already inactive.
    pub fn exit(&self) -> bool {
        self.transition(false)
    }

    fn transition(&self, target: bool) -> bool {
        if self.active.swap(target, Ordering::SeqCst) == target {
            return false;
        }
        info!(mode = %self.mode, active = target, "Mode changed");

        if let Some(on_change) = &self.on_change {
            on_change(target);
        }
        if let Some((on, off)) = self.mode.events() {
            let event = if target { on } else { off };
            self.events.trigger(event, EventPayload::None);
        }
        true
    }
}

impl std::fmt::Debug for ModeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeHandler")
            .field("mode", &self.mode)
            .field("active", &self.is_active())
            .finish()
    }
}

/// "Fixed controller" visual state, tied to fullscreen but observed separately
#[derive(Debug)]
struct FixedController {
    active: AtomicBool,
    events: WeakEventBus,
}

impl FixedController {
    fn set(&self, flag: bool) {
        self.active.store(flag, Ordering::SeqCst);
        let event = if flag {
            PlayerEvent::FixedController
        } else {
            PlayerEvent::FixedControllerOff
        };
        self.events.trigger(event, EventPayload::None);
    }
}

/// Coordinates the presentation modes of one player
#[derive(Debug)]
pub struct ModeCoordinator {
    fullscreen: Arc<ModeHandler>,
    webfull: Arc<ModeHandler>,
    pip: Arc<ModeHandler>,
    fixed_controller: Arc<FixedController>,
    closed: AtomicBool,
}

impl ModeCoordinator {
    /// Create the mode handlers and wire the exclusivity rule on `events`
    pub fn new(events: &EventBus) -> Self {
        let weak = events.downgrade();

        let fixed_controller = Arc::new(FixedController {
            active: AtomicBool::new(false),
            events: weak.clone(),
        });

        let fixed = fixed_controller.clone();
        let fullscreen = Arc::new(
            ModeHandler::new(Mode::Fullscreen, weak.clone())
                .with_on_change(move |flag| fixed.set(flag)),
        );
        let webfull = Arc::new(ModeHandler::new(Mode::Webfull, weak.clone()));
        let pip = Arc::new(ModeHandler::new(Mode::Pip, weak));

        let coordinator = Self {
            fullscreen,
            webfull,
            pip,
            fixed_controller,
            closed: AtomicBool::new(false),
        };
        coordinator.wire(events);
        coordinator
    }

    fn wire(&self, events: &EventBus) {
        let fullscreen = self.fullscreen.clone();
        events.on(PlayerEvent::Webfull, move |_| {
            fullscreen.exit();
        });

        let webfull = self.webfull.clone();
        events.on(PlayerEvent::Fullscreen, move |_| {
            webfull.exit();
        });
    }

    /// Handler of a mode. Wide has none.
    pub fn handler(&self, mode: Mode) -> Option<&Arc<ModeHandler>> {
        match mode {
            Mode::Fullscreen => Some(&self.fullscreen),
            Mode::Webfull => Some(&self.webfull),
            Mode::Pip => Some(&self.pip),
            Mode::Wide => None,
        }
    }

    /// Enter a mode. Returns whether anything changed. Always `false`
    /// once the coordinator is closed.
    pub fn enter(&self, mode: Mode) -> bool {
        if self.is_closed() {
            return false;
        }
        self.handler(mode).map(|h| h.enter()).unwrap_or(false)
    }

    /// Exit a mode. Returns whether anything changed.
    pub fn exit(&self, mode: Mode) -> bool {
        self.handler(mode).map(|h| h.exit()).unwrap_or(false)
    }

    /// Flip a mode
    pub fn toggle(&self, mode: Mode) -> bool {
        if self.is_active(mode) {
            self.exit(mode)
        } else {
            self.enter(mode)
        }
    }

    pub fn is_active(&self, mode: Mode) -> bool {
        self.handler(mode).map(|h| h.is_active()).unwrap_or(false)
    }

    pub fn is_fixed_controller(&self) -> bool {
        self.fixed_controller.active.load(Ordering::SeqCst)
    }

    /// Force the fixed-controller state and emit its event
    pub fn fixed_controller(&self, flag: bool) {
        self.fixed_controller.set(flag);
    }

    /// Leave every active mode
    pub fn exit_all(&self) {
        for mode in [Mode::Pip, Mode::Webfull, Mode::Fullscreen] {
            self.exit(mode);
        }
    }

    /// Leave every mode and refuse to enter any again. The exclusivity
    /// wiring lives on the event bus, which does not outlive teardown.
    pub fn close(&self) {
        self.exit_all();
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ModeState {
        ModeState {
            fullscreen: self.is_active(Mode::Fullscreen),
            webfull: self.is_active(Mode::Webfull),
            pip: self.is_active(Mode::Pip),
            wide: false,
            fixed_controller: self.is_fixed_controller(),
        }
    }
}
