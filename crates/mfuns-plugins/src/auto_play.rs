//! Start playback once the player is up and whenever a part loads

use mfuns_core::{
    Component, Entry, EventHandler, Player, PlayerEvent, PlayerRef, Plugin, PluginDescriptor,
    Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub struct AutoPlay {
    player: PlayerRef,
    enabled: Arc<AtomicBool>,
    listener: Mutex<Option<EventHandler>>,
}

impl AutoPlay {
    pub const NAME: &'static str = "autoPlay";

    pub fn new(player: &PlayerRef) -> Self {
        Self {
            player: player.clone(),
            enabled: Arc::new(AtomicBool::new(false)),
            listener: Mutex::new(None),
        }
    }

    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            Self::NAME,
            Entry::factory(|player| Arc::new(AutoPlay::new(player)) as Arc<dyn Plugin>),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, flag: bool) {
        self.enabled.store(flag, Ordering::SeqCst);
    }
}

/// Play unless already playing. `play` still runs its hook.
fn start(player: &PlayerRef) {
    let Ok(player) = player.upgrade() else {
        return;
    };
    if !player.video().paused() {
        return;
    }
    crate::spawn("autoPlay", async move {
        let outcome = player.play().await?;
        debug!(?outcome, "Auto play");
        Ok(())
    });
}

impl Component for AutoPlay {
    fn init(&self, player: &Player) -> Result<()> {
        self.set_enabled(player.config().auto_play);
        Ok(())
    }

    fn mounted(&self, player: &Player) -> Result<()> {
        let weak = self.player.clone();
        let enabled = self.enabled.clone();
        let handler = player.on(PlayerEvent::PartChange, move |_| {
            if enabled.load(Ordering::SeqCst) {
                start(&weak);
            }
        });
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler);

        if self.is_enabled() {
            start(&self.player);
        }
        Ok(())
    }

    fn detach(&self, player: &Player) {
        if let Some(handler) = self.listener.lock().unwrap_or_else(PoisonError::into_inner).take() {
            player.off(&PlayerEvent::PartChange, &handler);
        }
    }
}

impl Plugin for AutoPlay {}

#[cfg(test)]
mod tests {
    use super::*;
    use mfuns_core::{
        hook_fn, HeadlessVideo, HookName, HookVerdict, PlayerConfig, VideoOptions, VideoPart,
    };
    use std::time::Duration;

    fn player(auto_play: bool) -> Arc<Player> {
        let config = PlayerConfig {
            plugins: vec![AutoPlay::descriptor()],
            auto_play,
            video: VideoOptions {
                list: vec![
                    VideoPart::new("P1", "1.mp4").with_duration(10.0),
                    VideoPart::new("P2", "2.mp4").with_duration(10.0),
                ],
                part: 1,
            },
            ..Default::default()
        };
        let video = Arc::new(HeadlessVideo::new(&config.video));
        Player::new(config, video).unwrap()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test]
    async fn test_plays_once_mounted() {
        let player = player(true);
        settle().await;
        assert!(!player.video().paused());
    }

    #[tokio::test]
    async fn test_plays_when_a_part_loads_paused() {
        let player = player(true);
        settle().await;
        player.pause().await.unwrap();

        player.set_part(2, false).await.unwrap();
        settle().await;
        assert_eq!(player.video().part(), 2);
        assert!(!player.video().paused());
    }

    #[tokio::test]
    async fn test_disabled_stays_paused() {
        let player = player(false);
        settle().await;
        player.set_part(2, false).await.unwrap();
        settle().await;
        assert!(player.video().paused());
    }

    #[tokio::test]
    async fn test_play_hook_can_veto() {
        let player = player(true);
        settle().await;
        player.pause().await.unwrap();
        player.hooks().register(
            HookName::BeforePlay,
            hook_fn(|_| async { Ok(HookVerdict::Reject) }),
            false,
        );

        player.set_part(2, false).await.unwrap();
        settle().await;
        assert!(player.video().paused());
    }

    #[test]
    fn test_without_runtime_construction_still_succeeds() {
        let player = player(true);
        assert!(player.video().paused());
        assert!(player.plugins().get_as::<AutoPlay>(AutoPlay::NAME).unwrap().is_enabled());
    }
}
