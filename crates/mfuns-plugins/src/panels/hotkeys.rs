//! Keyboard shortcuts
//!
//! The panel listens for `keydown` events once mounted.
//!
//! | Key               | Action                     |
//! |-------------------|----------------------------|
//! | space             | play / pause               |
//! | f                 | toggle fullscreen          |
//! | w                 | toggle web fullscreen      |
//! | p                 | toggle picture-in-picture  |
//! | escape            | leave fullscreen modes     |
//! | arrowleft / right | seek by `seekStep` seconds |
//! | arrowup / down    | volume by `volumeStep`     |
//! | m                 | toggle mute                |

use mfuns_core::{
    Component, Entry, EventHandler, EventPayload, Mode, OptionsBlock, Panel, PanelDescriptor,
    Player, PlayerEvent, PlayerRef, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// `hotkeys` option block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotkeysOptions {
    pub enabled: bool,
    /// Seconds per arrow press
    pub seek_step: f64,
    /// Volume delta per arrow press
    pub volume_step: f64,
}

impl Default for HotkeysOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            seek_step: 5.0,
            volume_step: 0.1,
        }
    }
}

impl OptionsBlock for HotkeysOptions {
    const NAMESPACE: &'static str = "hotkeys";

    fn validate(&self) -> std::result::Result<(), String> {
        if self.seek_step.is_nan() || self.seek_step <= 0.0 {
            return Err(format!("seekStep must be positive, got {}", self.seek_step));
        }
        if self.volume_step.is_nan() || self.volume_step <= 0.0 || self.volume_step > 1.0 {
            return Err(format!("volumeStep must be in (0, 1], got {}", self.volume_step));
        }
        Ok(())
    }
}

/// What a bound key does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HotkeyAction {
    TogglePlay,
    ToggleMode(Mode),
    ExitFullscreen,
    Seek(f64),
    Volume(f64),
    ToggleMute,
}

impl HotkeyAction {
    /// Binding for `key` under `options`, matched case-insensitively
    pub fn for_key(key: &str, options: &HotkeysOptions) -> Option<Self> {
        let action = match key.to_ascii_lowercase().as_str() {
            " " | "space" => HotkeyAction::TogglePlay,
            "f" => HotkeyAction::ToggleMode(Mode::Fullscreen),
            "w" => HotkeyAction::ToggleMode(Mode::Webfull),
            "p" => HotkeyAction::ToggleMode(Mode::Pip),
            "escape" => HotkeyAction::ExitFullscreen,
            "arrowleft" => HotkeyAction::Seek(-options.seek_step),
            "arrowright" => HotkeyAction::Seek(options.seek_step),
            "arrowup" => HotkeyAction::Volume(options.volume_step),
            "arrowdown" => HotkeyAction::Volume(-options.volume_step),
            "m" => HotkeyAction::ToggleMute,
            _ => return None,
        };
        Some(action)
    }

    /// Mode and volume changes apply at once; play and seek go through
    /// their hooks on the runtime.
    fn run(self, player: Arc<Player>) {
        match self {
            HotkeyAction::ToggleMode(mode) => {
                player.mode().toggle(mode);
            }
            HotkeyAction::ExitFullscreen => {
                player.exit_fullscreen();
                player.exit_webfull();
            }
            HotkeyAction::Volume(delta) => player.set_volume(player.video().volume() + delta),
            HotkeyAction::ToggleMute => player.mute(!player.video().muted()),
            HotkeyAction::TogglePlay => crate::spawn("hotkeys", async move {
                player.toggle().await?;
                Ok(())
            }),
            HotkeyAction::Seek(delta) => crate::spawn("hotkeys", async move {
                let target = player.video().current_time() + delta;
                player.seek(target).await?;
                Ok(())
            }),
        }
    }
}

pub struct Hotkeys {
    player: PlayerRef,
    options: Arc<Mutex<HotkeysOptions>>,
    listener: Mutex<Option<EventHandler>>,
}

impl Hotkeys {
    pub const NAME: &'static str = "hotkeys";

    pub fn new(player: &PlayerRef) -> Self {
        Self {
            player: player.clone(),
            options: Arc::new(Mutex::new(HotkeysOptions::default())),
            listener: Mutex::new(None),
        }
    }

    pub fn descriptor() -> PanelDescriptor {
        PanelDescriptor::new(
            Self::NAME,
            Entry::factory(|player| Arc::new(Hotkeys::new(player)) as Arc<dyn Panel>),
        )
    }

    pub fn options(&self) -> HotkeysOptions {
        self.slot().clone()
    }

    /// Turn shortcuts on or off at runtime
    pub fn set_enabled(&self, flag: bool) {
        self.slot().enabled = flag;
    }

    fn slot(&self) -> MutexGuard<'_, HotkeysOptions> {
        self.options.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Component for Hotkeys {
    fn init(&self, player: &Player) -> Result<()> {
        *self.slot() = player.config().options.block::<HotkeysOptions>()?;
        Ok(())
    }

    fn mounted(&self, player: &Player) -> Result<()> {
        let weak = self.player.clone();
        let options = self.options.clone();

        let handler = player.on(PlayerEvent::Keydown, move |payload| {
            let EventPayload::Key(key) = payload else {
                return;
            };
            let options = options.lock().unwrap_or_else(PoisonError::into_inner).clone();
            if !options.enabled {
                return;
            }
            let Some(action) = HotkeyAction::for_key(key, &options) else {
                debug!(key = %key, "Unbound key");
                return;
            };
            if let Ok(player) = weak.upgrade() {
                debug!(key = %key, ?action, "Hotkey");
                action.run(player);
            }
        });
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler);
        Ok(())
    }

    fn detach(&self, player: &Player) {
        if let Some(handler) = self.listener.lock().unwrap_or_else(PoisonError::into_inner).take() {
            player.off(&PlayerEvent::Keydown, &handler);
        }
    }
}

impl Panel for Hotkeys {
    fn title(&self) -> String {
        "Hotkeys".to_string()
    }
}
