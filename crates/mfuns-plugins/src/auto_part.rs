//! Advance to the next part when the current one ends

use mfuns_core::{
    Component, Entry, EventHandler, Player, PlayerEvent, PlayerRef, Plugin, PluginDescriptor,
    Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub struct AutoPart {
    player: PlayerRef,
    enabled: Arc<AtomicBool>,
    listener: Mutex<Option<EventHandler>>,
}

impl AutoPart {
    pub const NAME: &'static str = "autoPart";

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
            Entry::factory(|player| Arc::new(AutoPart::new(player)) as Arc<dyn Plugin>),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// User-facing switch, initialised from the `auto_part` option
    pub fn set_enabled(&self, flag: bool) {
        self.enabled.store(flag, Ordering::SeqCst);
    }
}

impl Component for AutoPart {
    fn init(&self, player: &Player) -> Result<()> {
        self.set_enabled(player.config().auto_part);
        Ok(())
    }

    fn mounted(&self, player: &Player) -> Result<()> {
        let weak = self.player.clone();
        let enabled = self.enabled.clone();

        let handler = player.on(PlayerEvent::Ended, move |_| {
            if !enabled.load(Ordering::SeqCst) {
                return;
            }
            let Ok(player) = weak.upgrade() else {
                return;
            };
            crate::spawn("autoPart", async move {
                match player.next().await? {
                    Some(outcome) => debug!(?outcome, "Auto part advanced"),
                    None => debug!("Last part ended"),
                }
                Ok(())
            });
        });
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler);
        Ok(())
    }

    fn detach(&self, player: &Player) {
        if let Some(handler) = self.listener.lock().unwrap_or_else(PoisonError::into_inner).take() {
            player.off(&PlayerEvent::Ended, &handler);
        }
    }
}

impl Plugin for AutoPart {}

#[cfg(test)]
mod tests {
    use super::*;
    use mfuns_core::{
        hook_fn, EventPayload, HeadlessVideo, HookName, HookVerdict, MediaEvent, PlayerConfig,
        VideoOptions, VideoPart,
    };
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn config(auto_part: bool, plugins: Vec<PluginDescriptor>) -> PlayerConfig {
        PlayerConfig {
            plugins,
            auto_part,
            video: VideoOptions {
                list: (1..=3)
                    .map(|i| VideoPart::new(format!("P{}", i), format!("{}.mp4", i)).with_duration(10.0))
                    .collect(),
                part: 1,
            },
            ..Default::default()
        }
    }

    fn player(auto_part: bool) -> Arc<Player> {
        let config = config(auto_part, vec![AutoPart::descriptor()]);
        let video = Arc::new(HeadlessVideo::new(&config.video));
        Player::new(config, video).unwrap()
    }

    fn part_changes(player: &Player) -> mpsc::UnboundedReceiver<usize> {
        let (tx, rx) = mpsc::unbounded_channel();
        player.on(PlayerEvent::PartChange, move |payload| {
            if let EventPayload::Part(part) = payload {
                let _ = tx.send(*part);
            }
        });
        rx
    }

    #[tokio::test]
    async fn test_advances_on_ended() {
        let player = player(true);
        let mut rx = part_changes(&player);

        player.handle_media_event(MediaEvent::Ended);

        let part = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(part, Some(2));
        assert!(!player.video().paused());
    }

    #[tokio::test]
    async fn test_disabled_does_nothing() {
        let player = player(false);
        let mut rx = part_changes(&player);

        player.handle_media_event(MediaEvent::Ended);
        tokio::task::yield_now().await;

        assert!(rx.try_recv().is_err());
        assert_eq!(player.video().part(), 1);
    }

    #[tokio::test]
    async fn test_respects_part_change_hook() {
        let player = player(true);
        let (tx, mut rx) = mpsc::unbounded_channel();
        player.hooks().register(
            HookName::BeforePartChange,
            hook_fn(move |_| {
                let _ = tx.send(());
                async { Ok(HookVerdict::Reject) }
            }),
            false,
        );

        player.handle_media_event(MediaEvent::Ended);
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        tokio::task::yield_now().await;

        assert_eq!(player.video().part(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_install_advances_once() {
        let config = config(true, vec![AutoPart::descriptor(), AutoPart::descriptor()]);
        let video = Arc::new(HeadlessVideo::new(&config.video));
        let player = Player::new(config, video).unwrap();
        assert_eq!(player.plugins().names(), vec![AutoPart::NAME]);
        assert_eq!(player.events().listener_count(&PlayerEvent::Ended), 1);

        let mut rx = part_changes(&player);
        player.handle_media_event(MediaEvent::Ended);
        let part = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(part, Some(2));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(player.video().part(), 2);
    }

    #[test]
    fn test_unregister_stops_listening() {
        let player = player(true);
        assert_eq!(player.events().listener_count(&PlayerEvent::Ended), 1);
        player.plugins().unregister(AutoPart::NAME);
        assert_eq!(player.events().listener_count(&PlayerEvent::Ended), 0);
    }

    #[test]
    fn test_switch_follows_config() {
        let on = player(true);
        let auto = on.plugins().get_as::<AutoPart>(AutoPart::NAME).unwrap();
        assert!(auto.is_enabled());
        auto.set_enabled(false);
        assert!(!auto.is_enabled());

        let off = player(false);
        let auto = off.plugins().get_as::<AutoPart>(AutoPart::NAME).unwrap();
        assert!(!auto.is_enabled());
    }
}
