//! Theme color
//!
//! Validates the configured theme color and announces it. Applying the
//! color to the page is left to whoever listens for `theme_change`.

use mfuns_core::{
    Component, Entry, Error, EventPayload, Player, PlayerEvent, Plugin, PluginDescriptor, Result,
    DEFAULT_THEME_COLOR,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

pub struct Theme {
    color: Mutex<String>,
}

impl Theme {
    pub const NAME: &'static str = "theme";

    pub fn new() -> Self {
        Self {
            color: Mutex::new(DEFAULT_THEME_COLOR.to_string()),
        }
    }

    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(
            Self::NAME,
            Entry::factory(|_| Arc::new(Theme::new()) as Arc<dyn Plugin>),
        )
    }

    /// Current color
    pub fn color(&self) -> String {
        self.slot().clone()
    }

    /// Change the color at runtime and announce it
    pub fn set_color(&self, player: &Player, color: &str) -> Result<()> {
        let color = parse_color(color)?;
        info!(color = %color, "Theme color set");
        *self.slot() = color.clone();
        player.trigger(PlayerEvent::ThemeChange, EventPayload::Color(color));
        Ok(())
    }

    fn slot(&self) -> MutexGuard<'_, String> {
        self.color.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Theme {
    fn init(&self, player: &Player) -> Result<()> {
        let color = parse_color(&player.config().theme_color)?;
        *self.slot() = color;
        Ok(())
    }

    fn mounted(&self, player: &Player) -> Result<()> {
        player.trigger(PlayerEvent::ThemeChange, EventPayload::Color(self.color()));
        Ok(())
    }
}

impl Plugin for Theme {}

/// Accept `#rgb` or `#rrggbb`, normalised to lowercase `#rrggbb`
pub fn parse_color(input: &str) -> Result<String> {
    let invalid = || Error::InvalidOption {
        namespace: "themeColor".to_string(),
        reason: format!("'{}' is not a #rgb or #rrggbb color", input),
    };

    let hex = input.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let full = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        _ => return Err(invalid()),
    };
    Ok(format!("#{}", full.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfuns_core::{HeadlessVideo, PlayerConfig};

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#00A1D6").unwrap(), "#00a1d6");
        assert_eq!(parse_color("#f69").unwrap(), "#ff6699");
        assert!(parse_color("00a1d6").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#ggg").is_err());
    }

    #[test]
    fn test_announces_color_on_mount() {
        let config = PlayerConfig {
            plugins: vec![Theme::descriptor()],
            theme_color: "#F69".to_string(),
            ..Default::default()
        };

        // The event fires during construction, so observe it through a plugin
        // registered ahead of the theme
        let seen = Arc::new(Mutex::new(Vec::new()));
        struct Observer(Arc<Mutex<Vec<EventPayload>>>);
        impl Component for Observer {
            fn init(&self, player: &Player) -> Result<()> {
                let seen = self.0.clone();
                player.on(PlayerEvent::ThemeChange, move |p| seen.lock().unwrap().push(p.clone()));
                Ok(())
            }
        }
        impl Plugin for Observer {}

        let s = seen.clone();
        let mut plugins = vec![PluginDescriptor::new(
            "observer",
            Entry::factory(move |_| Arc::new(Observer(s.clone())) as Arc<dyn Plugin>),
        )];
        plugins.extend(config.plugins.clone());
        let config = PlayerConfig { plugins, ..config };

        Player::new(config, Arc::new(HeadlessVideo::default())).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventPayload::Color("#ff6699".to_string())]
        );
    }

    #[test]
    fn test_invalid_color_fails_construction() {
        let config = PlayerConfig {
            plugins: vec![Theme::descriptor()],
            theme_color: "purple".to_string(),
            ..Default::default()
        };
        let err = Player::new(config, Arc::new(HeadlessVideo::default())).unwrap_err();
        assert_eq!(err.error_code(), "LIFECYCLE");
    }

    #[test]
    fn test_set_color_at_runtime() {
        let config = PlayerConfig {
            plugins: vec![Theme::descriptor()],
            ..Default::default()
        };
        let player = Player::new(config, Arc::new(HeadlessVideo::default())).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        player.on(PlayerEvent::ThemeChange, move |p| s.lock().unwrap().push(p.clone()));

        let theme = player.plugins().get_as::<Theme>(Theme::NAME).unwrap();
        assert_eq!(theme.color(), DEFAULT_THEME_COLOR);
        theme.set_color(&player, "#ABC").unwrap();
        assert!(theme.set_color(&player, "nope").is_err());

        let registered = player.plugins().get_as::<Theme>(Theme::NAME).unwrap();
        assert_eq!(registered.color(), "#aabbcc");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventPayload::Color("#aabbcc".to_string())]
        );
    }
}
