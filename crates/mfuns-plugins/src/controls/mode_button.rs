//! Buttons that toggle a presentation mode

use mfuns_core::{Component, Control, ControlDescriptor, Entry, Mode, Player, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Toggles one mode when clicked
pub struct ModeButton {
    mode: Mode,
    hidden: AtomicBool,
}

impl ModeButton {
    pub const FULLSCREEN: &'static str = "buttonFullscreen";
    pub const WEBFULL: &'static str = "buttonWebfull";
    pub const PIP: &'static str = "buttonPip";

    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            hidden: AtomicBool::new(false),
        }
    }

    pub fn fullscreen() -> ControlDescriptor {
        Self::descriptor(Self::FULLSCREEN, Mode::Fullscreen)
    }

    pub fn webfull() -> ControlDescriptor {
        Self::descriptor(Self::WEBFULL, Mode::Webfull)
    }

    pub fn pip() -> ControlDescriptor {
        Self::descriptor(Self::PIP, Mode::Pip)
    }

    fn descriptor(name: &str, mode: Mode) -> ControlDescriptor {
        ControlDescriptor::new(
            name,
            Entry::factory(move |_| Arc::new(ModeButton::new(mode)) as Arc<dyn Control>),
        )
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Hide the button without uninstalling it, e.g. when the platform
    /// lacks picture-in-picture
    pub fn set_hidden(&self, flag: bool) {
        self.hidden.store(flag, Ordering::SeqCst);
    }
}

impl Component for ModeButton {
    fn is_ignored(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }
}

impl Control for ModeButton {
    fn tooltip(&self) -> Option<String> {
        let label = match self.mode {
            Mode::Fullscreen => "Fullscreen",
            Mode::Webfull => "Web fullscreen",
            Mode::Pip => "Picture-in-picture",
            Mode::Wide => "Wide mode",
        };
        Some(label.to_string())
    }

    fn activate(&self, player: &Player) -> Result<()> {
        let changed = player.mode().toggle(self.mode);
        debug!(mode = %self.mode, changed, "Mode button clicked");
        Ok(())
    }
}
