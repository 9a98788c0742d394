//! Bundled presets
//!
//! A preset is a base [`PlayerConfig`]; consumer options are folded on top
//! with [`compose`], so preset entries always come first.

use crate::controls::ModeButton;
use crate::panels::{About, Hotkeys, PartList};
use crate::{AutoPart, AutoPlay, Theme};
use mfuns_core::{compose, Error, PlayerConfig, PlayerOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Theme and the fullscreen / picture-in-picture buttons
pub fn preset_basic(options: PlayerOptions) -> PlayerConfig {
    compose(basic(), options)
}

/// Everything built in, with part auto-advance on unless overridden
pub fn preset_standard(options: PlayerOptions) -> PlayerConfig {
    compose(standard(), options)
}

fn basic() -> PlayerConfig {
    PlayerConfig {
        plugins: vec![Theme::descriptor()],
        controls: vec![ModeButton::fullscreen(), ModeButton::pip()],
        ..Default::default()
    }
}

fn standard() -> PlayerConfig {
    PlayerConfig {
        plugins: vec![
            Theme::descriptor(),
            AutoPlay::descriptor(),
            AutoPart::descriptor(),
        ],
        controls: vec![
            ModeButton::fullscreen(),
            ModeButton::webfull(),
            ModeButton::pip(),
        ],
        panels: vec![
            About::descriptor(),
            Hotkeys::descriptor(),
            PartList::descriptor(),
        ],
        auto_part: true,
        ..Default::default()
    }
}

/// Preset selectable by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Basic,
    Standard,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Basic, Preset::Standard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Basic => "basic",
            Preset::Standard => "standard",
        }
    }

    pub fn apply(&self, options: PlayerOptions) -> PlayerConfig {
        match self {
            Preset::Basic => preset_basic(options),
            Preset::Standard => preset_standard(options),
        }
    }

    /// Base configuration before any consumer options
    pub fn base(&self) -> PlayerConfig {
        self.apply(PlayerOptions::default())
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Preset::Basic),
            "standard" => Ok(Preset::Standard),
            other => Err(Error::InvalidConfig(format!("unknown preset '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfuns_core::{Component, Entry, Plugin, PluginDescriptor};
    use std::sync::Arc;

    struct Extra;
    impl Component for Extra {}
    impl Plugin for Extra {}

    fn extra() -> PluginDescriptor {
        PluginDescriptor::new("extra", Entry::instance(Arc::new(Extra) as Arc<dyn Plugin>))
    }

    #[test]
    fn test_consumer_plugins_follow_preset_plugins() {
        let config = preset_standard(PlayerOptions::new().plugin(extra()));
        let summary = config.summary();
        assert_eq!(summary.plugins, vec!["theme", "autoPlay", "autoPart", "extra"]);
        assert_eq!(
            summary.controls,
            vec!["buttonFullscreen", "buttonWebfull", "buttonPip"]
        );
        assert_eq!(summary.panels, vec!["about", "hotkeys", "partList"]);
    }

    #[test]
    fn test_auto_part_default_and_override() {
        assert!(!preset_basic(PlayerOptions::new()).auto_part);
        assert!(preset_standard(PlayerOptions::new()).auto_part);
        assert!(!preset_standard(PlayerOptions::new().auto_part(false)).auto_part);
        assert!(!preset_standard(PlayerOptions::new()).auto_play);
        assert!(preset_standard(PlayerOptions::new().auto_play(true)).auto_play);
    }

    #[test]
    fn test_theme_color_override() {
        let config = preset_basic(PlayerOptions::new().theme_color("#f69"));
        assert_eq!(config.theme_color, "#f69");
        assert_eq!(config.summary().plugins, vec!["theme"]);
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!("Standard".parse::<Preset>().unwrap(), Preset::Standard);
        assert_eq!(Preset::default(), Preset::Basic);
        assert!("deluxe".parse::<Preset>().is_err());
        for preset in Preset::ALL {
            assert_eq!(preset.as_str().parse::<Preset>().unwrap(), preset);
        }
    }
}
