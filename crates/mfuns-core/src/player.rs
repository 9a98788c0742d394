//! Player facade
//!
//! Owns the event bus, hook pipeline, registries and mode coordinator of a
//! single player. Components receive a [`PlayerRef`], never an owning
//! handle, so dropping the last `Arc<Player>` tears everything down.
//!
//! Operations that can be vetoed (`play`, `pause`, `seek`, part changes)
//! run their hook first; a rejected hook leaves the video untouched.

use crate::events::{EventBus, EventHandler, EventPayload, PlayerEvent};
use crate::hooks::{HookContext, HookName, HookOutcome, HookPipeline};
use crate::mode::{Mode, ModeCoordinator, ModeState};
use crate::preset::PlayerConfig;
use crate::registry::{ControlsManager, PanelsManager, PluginManager};
use crate::video::{MediaEvent, Video};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Unique identifier of a player instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-owning reference to a player, handed to components
#[derive(Debug, Clone)]
pub struct PlayerRef(Weak<Player>);

impl PlayerRef {
    pub fn new(player: &Arc<Player>) -> Self {
        Self(Arc::downgrade(player))
    }

    /// Borrow the player for the duration of a call
    pub fn upgrade(&self) -> Result<Arc<Player>> {
        self.0.upgrade().ok_or(Error::PlayerDropped)
    }
}

/// The player
pub struct Player {
    id: PlayerId,
    config: PlayerConfig,
    events: EventBus,
    hooks: HookPipeline,
    plugins: PluginManager,
    controls: ControlsManager,
    panels: PanelsManager,
    mode: ModeCoordinator,
    video: Arc<dyn Video>,
    destroyed: AtomicBool,
}

impl Player {
    /// Create a player and install every configured component.
    ///
    /// Plugins install first, then controls, then panels, each in list
    /// order. The first component that fails its lifecycle aborts
    /// construction.
    pub fn new(config: PlayerConfig, video: Arc<dyn Video>) -> Result<Arc<Self>> {
        let player = Arc::new_cyclic(|weak: &Weak<Player>| {
            let events = EventBus::new();
            let mode = ModeCoordinator::new(&events);
            Player {
                id: PlayerId::new(),
                config: config.clone(),
                events,
                hooks: HookPipeline::new(),
                plugins: PluginManager::new("plugin", PlayerRef(weak.clone())),
                controls: ControlsManager::new("control", PlayerRef(weak.clone())),
                panels: PanelsManager::new("panel", PlayerRef(weak.clone())),
                mode,
                video,
                destroyed: AtomicBool::new(false),
            }
        });

        info!(
            player_id = %player.id,
            plugins = config.plugins.len(),
            controls = config.controls.len(),
            panels = config.panels.len(),
            "Creating player"
        );

        for descriptor in config.plugins {
            player.plugins.register(&descriptor.name, descriptor.entry)?;
        }
        for descriptor in config.controls {
            player.controls.register(&descriptor.name, descriptor.entry)?;
        }
        for descriptor in config.panels {
            player.panels.register(&descriptor.name, descriptor.entry)?;
        }

        Ok(player)
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn hooks(&self) -> &HookPipeline {
        &self.hooks
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    pub fn controls(&self) -> &ControlsManager {
        &self.controls
    }

    pub fn panels(&self) -> &PanelsManager {
        &self.panels
    }

    pub fn mode(&self) -> &ModeCoordinator {
        &self.mode
    }

    pub fn video(&self) -> &Arc<dyn Video> {
        &self.video
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    // ─── Event bus ────────────────────────────────────────────────────

    pub fn on<F>(&self, event: PlayerEvent, handler: F) -> EventHandler
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.events.on(event, handler)
    }

    pub fn off(&self, event: &PlayerEvent, handler: &EventHandler) {
        self.events.off(event, handler)
    }

    pub fn trigger(&self, event: PlayerEvent, payload: EventPayload) {
        self.events.trigger(event, payload)
    }

    // ─── Playback ─────────────────────────────────────────────────────

    /// Start playback unless a `beforePlay` handler rejects it
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn play(&self) -> Result<HookOutcome> {
        let outcome = self.gate(HookName::BeforePlay, HookContext::None).await?;
        if outcome.is_accepted() {
            self.video.play();
        }
        Ok(outcome)
    }

    /// Pause playback unless a `beforePause` handler rejects it
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn pause(&self) -> Result<HookOutcome> {
        let outcome = self.gate(HookName::BeforePause, HookContext::None).await?;
        if outcome.is_accepted() {
            self.video.pause();
        }
        Ok(outcome)
    }

    /// Play when paused, pause when playing
    pub async fn toggle(&self) -> Result<HookOutcome> {
        if self.video.paused() {
            self.play().await
        } else {
            self.pause().await
        }
    }

    /// Seek, clamped by the video, after `beforeSeek` accepts
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn seek(&self, time: f64) -> Result<HookOutcome> {
        let ctx = HookContext::Seek {
            from: self.video.current_time(),
            to: time,
        };
        let outcome = self.gate(HookName::BeforeSeek, ctx).await?;
        if outcome.is_accepted() {
            self.video.seek(time);
            self.trigger(PlayerEvent::Seek, EventPayload::Time(self.video.current_time()));
        }
        Ok(outcome)
    }

    /// Load a 1-based part after `beforePartChange` accepts
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn set_part(&self, part: usize, autoplay: bool) -> Result<HookOutcome> {
        let count = self.video.part_count();
        if part == 0 || part > count {
            return Err(Error::InvalidPart { part, count });
        }

        let ctx = HookContext::Part {
            from: self.video.part(),
            to: part,
        };
        let outcome = self.gate(HookName::BeforePartChange, ctx).await?;
        if outcome.is_accepted() {
            self.video.set_part(part, autoplay)?;
            info!(part, autoplay, "Part changed");
            self.trigger(PlayerEvent::PartChange, EventPayload::Part(part));
        }
        Ok(outcome)
    }

    /// Next part, playing. `None` on the last part.
    pub async fn next(&self) -> Result<Option<HookOutcome>> {
        let part = self.video.part();
        if part >= self.video.part_count() {
            return Ok(None);
        }
        self.set_part(part + 1, true).await.map(Some)
    }

    /// Previous part, playing. `None` on the first part.
    pub async fn prev(&self) -> Result<Option<HookOutcome>> {
        let part = self.video.part();
        if part <= 1 {
            return Ok(None);
        }
        self.set_part(part - 1, true).await.map(Some)
    }

    pub fn set_volume(&self, volume: f64) {
        self.video.set_volume(volume);
    }

    pub fn set_rate(&self, rate: f64) {
        self.video.set_rate(rate);
    }

    pub fn set_loop(&self, flag: bool) {
        self.video.set_loop(flag);
        let event = if flag {
            PlayerEvent::Loop
        } else {
            PlayerEvent::LoopOff
        };
        self.trigger(event, EventPayload::None);
    }

    pub fn mute(&self, flag: bool) {
        self.video.mute(flag);
    }

    /// Translate a media element notification into a player event
    pub fn handle_media_event(&self, event: MediaEvent) {
        let (event, payload) = match event {
            MediaEvent::Play => (PlayerEvent::Play, EventPayload::None),
            MediaEvent::Pause => (PlayerEvent::Pause, EventPayload::None),
            MediaEvent::Ended => (PlayerEvent::Ended, EventPayload::Part(self.video.part())),
            MediaEvent::TimeUpdate => (
                PlayerEvent::TimeUpdate,
                EventPayload::Time(self.video.current_time()),
            ),
            MediaEvent::VolumeChange => (
                PlayerEvent::VolumeChange,
                EventPayload::Volume(self.video.volume()),
            ),
            MediaEvent::RateChange => (PlayerEvent::RateChange, EventPayload::Rate(self.video.rate())),
        };
        self.trigger(event, payload);
    }

    /// Forward a key press from the host page
    pub fn press_key(&self, key: &str) {
        self.trigger(PlayerEvent::Keydown, EventPayload::Key(key.to_string()));
    }

    // ─── Modes ────────────────────────────────────────────────────────
    //
    // Entering a mode does nothing once the player is destroyed.

    pub fn fullscreen(&self) {
        self.mode.enter(Mode::Fullscreen);
    }

    pub fn exit_fullscreen(&self) {
        self.mode.exit(Mode::Fullscreen);
    }

    pub fn is_fullscreen(&self) -> bool {
        self.mode.is_active(Mode::Fullscreen)
    }

    pub fn webfull(&self) {
        self.mode.enter(Mode::Webfull);
    }

    pub fn exit_webfull(&self) {
        self.mode.exit(Mode::Webfull);
    }

    pub fn is_webfull(&self) -> bool {
        self.mode.is_active(Mode::Webfull)
    }

    pub fn pip(&self) {
        self.mode.enter(Mode::Pip);
    }

    pub fn exit_pip(&self) {
        self.mode.exit(Mode::Pip);
    }

    pub fn is_pip(&self) -> bool {
        self.mode.is_active(Mode::Pip)
    }

    /// Wide mode is not implemented; this does nothing
    pub fn wide(&self) {
        self.mode.enter(Mode::Wide);
    }

    pub fn exit_wide(&self) {
        self.mode.exit(Mode::Wide);
    }

    pub fn is_wide(&self) -> bool {
        self.mode.is_active(Mode::Wide)
    }

    pub fn mode_state(&self) -> ModeState {
        self.mode.snapshot()
    }

    // ─── Teardown ─────────────────────────────────────────────────────

    /// Tear the player down.
    ///
    /// Components clean up in their `destroy` event handlers. Calling this
    /// twice is a no-op; a `beforeDestroy` rejection keeps the player alive.
    #[instrument(skip(self), fields(player_id = %self.id))]
    pub async fn destroy(&self) -> Result<HookOutcome> {
        if self.is_destroyed() {
            return Ok(HookOutcome::Accepted);
        }
        let outcome = self.hooks.invoke(HookName::BeforeDestroy, HookContext::None).await?;
        if outcome.is_rejected() {
            warn!("Destroy rejected by hook");
            return Ok(outcome);
        }
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return Ok(HookOutcome::Accepted);
        }

        self.video.pause();
        self.mode.close();
        self.trigger(PlayerEvent::Destroy, EventPayload::None);

        self.plugins.clear();
        self.controls.clear();
        self.panels.clear();
        self.hooks.clear();
        self.events.clear();

        info!("Player destroyed");
        Ok(HookOutcome::Accepted)
    }

    async fn gate(&self, hook: HookName, ctx: HookContext) -> Result<HookOutcome> {
        if self.is_destroyed() {
            return Err(Error::PlayerDestroyed);
        }
        let outcome = self.hooks.invoke(hook.clone(), ctx).await?;
        if outcome.is_rejected() {
            debug!(hook = %hook, "Operation vetoed");
        }
        Ok(outcome)
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("plugins", &self.plugins)
            .field("controls", &self.controls)
            .field("panels", &self.panels)
            .field("mode", &self.mode.snapshot())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
