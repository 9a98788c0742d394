//! Integration tests for Mfuns Plugins

use mfuns_core::{
    EventPayload, HeadlessVideo, MediaEvent, Player, PlayerConfig, PlayerEvent, PlayerOptions,
    VideoOptions, VideoPart,
};
use mfuns_plugins::{
    preset_basic, preset_standard, AutoPart, ConfigFile, ModeButton, PartList, Preset, Theme,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Helpers
// =============================================================================

fn new_player(config: PlayerConfig) -> Arc<Player> {
    let video = Arc::new(HeadlessVideo::new(&config.video));
    Player::new(config, video).unwrap()
}

fn three_parts() -> VideoOptions {
    VideoOptions {
        list: (1..=3)
            .map(|i| VideoPart::new(format!("P{}", i), format!("{}.mp4", i)).with_duration(30.0))
            .collect(),
        part: 1,
    }
}

fn record(player: &Player, events: &[PlayerEvent]) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for event in events {
        let log = log.clone();
        let name = event.to_string();
        player.on(event.clone(), move |_| log.lock().unwrap().push(name.clone()));
    }
    log
}

// =============================================================================
// Presets
// =============================================================================

#[test]
fn test_standard_preset_installs_everything() {
    let player = new_player(preset_standard(PlayerOptions::new().video(three_parts())));

    assert_eq!(player.plugins().names(), vec!["theme", "autoPlay", "autoPart"]);
    assert_eq!(
        player.controls().names(),
        vec!["buttonFullscreen", "buttonWebfull", "buttonPip"]
    );
    assert_eq!(player.panels().names(), vec!["about", "hotkeys", "partList"]);
    assert!(player.config().auto_part);
    assert!(!player.config().auto_play);
}

#[test]
fn test_basic_preset_with_consumer_control() {
    let config = preset_basic(PlayerOptions::new().control(ModeButton::webfull()));
    let player = new_player(config);
    assert_eq!(
        player.controls().names(),
        vec!["buttonFullscreen", "buttonPip", "buttonWebfull"]
    );
}

#[test]
fn test_duplicate_name_replaces_in_place() {
    let config = preset_basic(PlayerOptions::new().control(ModeButton::fullscreen()));
    let player = new_player(config);
    assert_eq!(player.controls().names(), vec!["buttonFullscreen", "buttonPip"]);
}

// =============================================================================
// Runtime behaviour
// =============================================================================

#[tokio::test]
async fn test_parts_play_through() {
    let player = new_player(preset_standard(PlayerOptions::new().video(three_parts())));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    player.on(PlayerEvent::PartChange, move |payload| {
        if let EventPayload::Part(part) = payload {
            let _ = tx.send(*part);
        }
    });

    player.play().await.unwrap();
    for expected in [2, 3] {
        player.handle_media_event(MediaEvent::Ended);
        let part = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(part, Some(expected));
    }

    // Last part: nothing left to advance to
    player.handle_media_event(MediaEvent::Ended);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(player.video().part(), 3);
}

#[tokio::test]
async fn test_consumer_auto_part_replaces_preset_copy() {
    let options = PlayerOptions::new()
        .video(three_parts())
        .plugin(AutoPart::descriptor());
    let player = new_player(preset_standard(options));
    assert_eq!(player.plugins().names(), vec!["theme", "autoPlay", "autoPart"]);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    player.on(PlayerEvent::PartChange, move |payload| {
        if let EventPayload::Part(part) = payload {
            let _ = tx.send(*part);
        }
    });

    player.handle_media_event(MediaEvent::Ended);
    let part = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap();
    assert_eq!(part, Some(2));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(player.video().part(), 2);
}

#[tokio::test]
async fn test_keys_reach_the_registered_hotkeys_panel() {
    let player = new_player(preset_standard(PlayerOptions::new().video(three_parts())));

    player.press_key("w");
    assert!(player.is_webfull());
    player.press_key("f");
    assert!(player.is_fullscreen());
    assert!(!player.is_webfull());

    player.press_key(" ");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!player.video().paused());
}

#[tokio::test]
async fn test_part_list_and_auto_play() {
    let options = PlayerOptions::new().video(three_parts()).auto_play(true);
    let player = new_player(preset_standard(options));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!player.video().paused());

    let parts = player.panels().get_as::<PartList>(PartList::NAME).unwrap();
    assert_eq!(parts.entries().unwrap().len(), 3);
    parts.select(3).await.unwrap();
    assert_eq!(player.video().part(), 3);

    // A part loaded paused is started by autoPlay
    player.pause().await.unwrap();
    player.set_part(1, false).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!player.video().paused());
}

#[test]
fn test_theme_color_changes_on_the_installed_plugin() {
    let player = new_player(preset_basic(PlayerOptions::new()));
    let theme = player.plugins().get_as::<Theme>(Theme::NAME).unwrap();
    theme.set_color(&player, "#F69").unwrap();
    assert_eq!(
        player.plugins().get_as::<Theme>(Theme::NAME).unwrap().color(),
        "#ff6699"
    );
}

#[test]
fn test_buttons_drive_mode_events() {
    let player = new_player(preset_standard(PlayerOptions::new()));
    let log = record(
        &player,
        &[
            PlayerEvent::Webfull,
            PlayerEvent::WebfullOff,
            PlayerEvent::Fullscreen,
            PlayerEvent::FullscreenOff,
        ],
    );

    for name in [ModeButton::WEBFULL, ModeButton::FULLSCREEN, ModeButton::FULLSCREEN] {
        let control = player.controls().get(name).unwrap().unwrap();
        control.activate(&player).unwrap();
    }

    assert_eq!(
        *log.lock().unwrap(),
        vec!["webfull", "webfull_off", "fullscreen", "fullscreen_off"]
    );
}

#[test]
fn test_destroy_clears_builtins() {
    let player = new_player(preset_standard(PlayerOptions::new()));
    player.fullscreen();
    tokio_test::assert_ok!(tokio_test::block_on(player.destroy()));
    tokio_test::assert_err!(tokio_test::block_on(player.play()));

    assert!(player.plugins().is_empty());
    assert!(player.controls().is_empty());
    assert!(player.panels().is_empty());
    assert!(!player.is_fullscreen());

    // Mode calls on a destroyed player change nothing
    player.fullscreen();
    player.webfull();
    assert!(!player.is_fullscreen());
    assert!(!player.is_webfull());
}

// =============================================================================
// Config files
// =============================================================================

#[test]
fn test_config_file_end_to_end() {
    let file = ConfigFile::from_json(
        r##"{
            "preset": "basic",
            "plugins": ["autoPart"],
            "panels": ["hotkeys"],
            "autoPart": true,
            "themeColor": "#ABC",
            "options": { "hotkeys": { "volumeStep": 0.05 } }
        }"##,
    )
    .unwrap();

    let player = new_player(file.compose(None).unwrap());
    assert_eq!(player.plugins().names(), vec!["theme", "autoPart"]);
    assert_eq!(player.panels().names(), vec!["hotkeys"]);
    assert!(player.config().auto_part);
}

#[test]
fn test_invalid_theme_in_file_fails() {
    let file = ConfigFile::from_json(r#"{ "themeColor": "blue" }"#).unwrap();
    let config = file.compose(Some(Preset::Basic)).unwrap();
    let err = Player::new(config, Arc::new(HeadlessVideo::default())).unwrap_err();
    assert_eq!(err.error_code(), "LIFECYCLE");
}
