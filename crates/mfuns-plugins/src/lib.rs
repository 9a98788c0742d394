//! # Mfuns Plugins
//!
//! Built-in features for the Mfuns player. Nothing here is special to the
//! core: every component goes through the same registries and hooks a
//! third-party plugin would use.
//!
//! ```text
//! ┌────────────── presets ───────────────┐
//! │  basic:    theme                     │
//! │            buttonFullscreen buttonPip│
//! │  standard: basic + autoPlay autoPart │
//! │            buttonWebfull             │
//! │            about hotkeys partList    │
//! └──────────────────┬───────────────────┘
//!                    │ compose()
//!                    ▼
//!              mfuns_core::Player
//! ```

use std::future::Future;
use tracing::warn;

pub mod auto_part;
pub mod auto_play;
pub mod catalog;
pub mod controls;
pub mod panels;
pub mod presets;
pub mod theme;

pub use auto_part::AutoPart;
pub use auto_play::AutoPlay;
pub use catalog::ConfigFile;
pub use controls::ModeButton;
pub use panels::{About, AboutInfo, HotkeyAction, Hotkeys, HotkeysOptions, PartEntry, PartList};
pub use presets::{preset_basic, preset_standard, Preset};
pub use theme::{parse_color, Theme};

/// Run a hook-gated operation started from a synchronous event handler.
/// Without a tokio runtime the task is dropped with a warning.
pub(crate) fn spawn<F>(task: &'static str, future: F)
where
    F: Future<Output = mfuns_core::Result<()>> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                if let Err(e) = future.await {
                    warn!(task, error = %e, "Background task failed");
                }
            });
        }
        Err(_) => warn!(task, "No async runtime, task skipped"),
    }
}
