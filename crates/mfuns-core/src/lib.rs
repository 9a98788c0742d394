//! Mfuns Core - Plugin orchestration for the Mfuns video player
//!
//! This crate provides the pieces every player feature plugs into:
//! - Hook pipeline with accept/reject short-circuiting
//! - Name-keyed registries for plugins, controls and panels
//! - Preset composition of defaults and consumer overrides
//! - Fullscreen / webfull / picture-in-picture coordination
//! - The player facade owning all of the above
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Mfuns Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Preset    │  │   Options    │  │    Video     │           │
//! │  │   Composer   │  │   Schemas    │  │  Capability  │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │   Player    │                              │
//! │                    │   Facade    │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐           │
//! │  │     Hook     │  │    Event    │  │     Mode     │           │
//! │  │   Pipeline   │  │     Bus     │  │ Coordinator  │           │
//! │  └──────────────┘  └──────┬──────┘  └──────────────┘           │
//! │                           │                                     │
//! │        ┌──────────────────┼──────────────────┐                  │
//! │  ┌─────┴────────┐  ┌──────┴───────┐  ┌───────┴──────┐           │
//! │  │   Plugins    │  │   Controls   │  │    Panels    │           │
//! │  └──────────────┘  └──────────────┘  └──────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod error;
pub mod events;
pub mod hooks;
pub mod mode;
pub mod options;
pub mod player;
pub mod preset;
pub mod registry;
pub mod video;

pub use error::{Error, Phase, Result};
pub use events::{EventBus, EventHandler, EventPayload, PlayerEvent, WeakEventBus};
pub use hooks::{
    hook_fn, HookContext, HookHandler, HookName, HookOutcome, HookPipeline, HookVerdict,
    SharedHook, MAX_HOOK_DEPTH,
};
pub use mode::{Mode, ModeCoordinator, ModeHandler, ModeState};
pub use options::{OptionsBlock, PluginOptions};
pub use player::{Player, PlayerId, PlayerRef};
pub use preset::{
    compose, ConfigSummary, ControlDescriptor, Descriptor, PanelDescriptor, PlayerConfig,
    PlayerOptions, PluginDescriptor, DEFAULT_THEME_COLOR,
};
pub use registry::{
    AsAny, Component, Control, ControlsManager, Entry, Factory, Lookup, Panel, PanelsManager,
    Plugin, PluginManager, Registry,
};
pub use video::{HeadlessVideo, MediaEvent, Video, VideoOptions, VideoPart, VideoSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library
pub fn init() {
    tracing::info!(version = VERSION, "Mfuns Core initialized");
}

/// Lock a mutex, recovering the data if a handler panicked while holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
