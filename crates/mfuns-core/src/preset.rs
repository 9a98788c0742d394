//! Preset composition
//!
//! A preset is a complete [`PlayerConfig`]. Consumers pass
//! [`PlayerOptions`]; [`compose`] folds them into a preset. List-valued keys
//! append to the preset's lists, so defaults always install first; scalar
//! keys take the consumer's value when one is given.

use crate::options::PluginOptions;
use crate::registry::{Control, Entry, Panel, Plugin};
use crate::video::VideoOptions;
use serde::{Deserialize, Serialize};

/// Theme color used when nobody picks one
pub const DEFAULT_THEME_COLOR: &str = "#00a1d6";

/// A named component to install into a registry
pub struct Descriptor<T: ?Sized> {
    pub name: String,
    pub entry: Entry<T>,
}

impl<T: ?Sized> Descriptor<T> {
    pub fn new(name: impl Into<String>, entry: Entry<T>) -> Self {
        Self {
            name: name.into(),
            entry,
        }
    }
}

impl<T: ?Sized> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            entry: self.entry.clone(),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("entry", &self.entry)
            .finish()
    }
}

pub type PluginDescriptor = Descriptor<dyn Plugin>;
pub type ControlDescriptor = Descriptor<dyn Control>;
pub type PanelDescriptor = Descriptor<dyn Panel>;

/// Fully resolved player configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub plugins: Vec<PluginDescriptor>,
    pub controls: Vec<ControlDescriptor>,
    pub panels: Vec<PanelDescriptor>,
    /// Advance to the next part when one ends
    pub auto_part: bool,
    /// Start playing once mounted and whenever a part loads
    pub auto_play: bool,
    pub theme_color: String,
    pub video: VideoOptions,
    /// Feature-owned option blocks
    pub options: PluginOptions,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            controls: Vec::new(),
            panels: Vec::new(),
            auto_part: false,
            auto_play: false,
            theme_color: DEFAULT_THEME_COLOR.to_string(),
            video: VideoOptions::default(),
            options: PluginOptions::default(),
        }
    }
}

impl PlayerConfig {
    /// Serializable view with component names instead of entries
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            plugins: self.plugins.iter().map(|d| d.name.clone()).collect(),
            controls: self.controls.iter().map(|d| d.name.clone()).collect(),
            panels: self.panels.iter().map(|d| d.name.clone()).collect(),
            auto_part: self.auto_part,
            auto_play: self.auto_play,
            theme_color: self.theme_color.clone(),
            video: self.video.clone(),
            options: self.options.clone(),
        }
    }
}

/// Consumer overrides. Every scalar is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerOptions {
    #[serde(skip)]
    pub plugins: Vec<PluginDescriptor>,
    #[serde(skip)]
    pub controls: Vec<ControlDescriptor>,
    #[serde(skip)]
    pub panels: Vec<PanelDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_part: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_play: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoOptions>,
    #[serde(skip_serializing_if = "PluginOptions::is_empty")]
    pub options: PluginOptions,
}

impl PlayerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugin(mut self, descriptor: PluginDescriptor) -> Self {
        self.plugins.push(descriptor);
        self
    }

    pub fn control(mut self, descriptor: ControlDescriptor) -> Self {
        self.controls.push(descriptor);
        self
    }

    pub fn panel(mut self, descriptor: PanelDescriptor) -> Self {
        self.panels.push(descriptor);
        self
    }

    pub fn auto_part(mut self, flag: bool) -> Self {
        self.auto_part = Some(flag);
        self
    }

    pub fn auto_play(mut self, flag: bool) -> Self {
        self.auto_play = Some(flag);
        self
    }

    pub fn theme_color(mut self, color: impl Into<String>) -> Self {
        self.theme_color = Some(color.into());
        self
    }

    pub fn video(mut self, video: VideoOptions) -> Self {
        self.video = Some(video);
        self
    }

    pub fn option(mut self, namespace: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(namespace, value);
        self
    }
}

/// Fold consumer overrides into a base preset
pub fn compose(base: PlayerConfig, overrides: PlayerOptions) -> PlayerConfig {
    let PlayerConfig {
        mut plugins,
        mut controls,
        mut panels,
        auto_part,
        auto_play,
        theme_color,
        video,
        options,
    } = base;

    plugins.extend(overrides.plugins);
    controls.extend(overrides.controls);
    panels.extend(overrides.panels);

    PlayerConfig {
        plugins,
        controls,
        panels,
        auto_part: overrides.auto_part.unwrap_or(auto_part),
        auto_play: overrides.auto_play.unwrap_or(auto_play),
        theme_color: overrides.theme_color.unwrap_or(theme_color),
        video: overrides.video.unwrap_or(video),
        options: options.merge(overrides.options),
    }
}

/// Serializable projection of a [`PlayerConfig`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub plugins: Vec<String>,
    pub controls: Vec<String>,
    pub panels: Vec<String>,
    pub auto_part: bool,
    pub auto_play: bool,
    pub theme_color: String,
    pub video: VideoOptions,
    pub options: PluginOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Component;
    use serde_json::json;
    use std::sync::Arc;

    struct Noop;
    impl Component for Noop {}
    impl Plugin for Noop {}

    fn plugin(name: &str) -> PluginDescriptor {
        Descriptor::new(name, Entry::instance(Arc::new(Noop) as Arc<dyn Plugin>))
    }

    fn names(config: &PlayerConfig) -> Vec<String> {
        config.summary().plugins
    }

    #[test]
    fn test_lists_are_concatenated_base_first() {
        let base = PlayerConfig {
            plugins: vec![plugin("A"), plugin("B")],
            ..Default::default()
        };
        let config = compose(base, PlayerOptions::new().plugin(plugin("C")));
        assert_eq!(names(&config), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_overrides_keep_defaults() {
        let base = PlayerConfig {
            plugins: vec![plugin("A")],
            auto_part: true,
            ..Default::default()
        };
        let config = compose(base, PlayerOptions::default());
        assert_eq!(names(&config), vec!["A"]);
        assert!(config.auto_part);
        assert_eq!(config.theme_color, DEFAULT_THEME_COLOR);
    }

    #[test]
    fn test_scalars_override() {
        let base = PlayerConfig {
            auto_part: true,
            ..Default::default()
        };
        let config = compose(
            base,
            PlayerOptions::new()
                .auto_part(false)
                .auto_play(true)
                .theme_color("#ff6699"),
        );
        assert!(!config.auto_part);
        assert!(config.auto_play);
        assert_eq!(config.theme_color, "#ff6699");
    }

    #[test]
    fn test_presets_chain() {
        let basic = compose(PlayerConfig::default(), PlayerOptions::new().plugin(plugin("theme")));
        let standard = compose(basic, PlayerOptions::new().plugin(plugin("autoPart")).auto_part(true));
        let consumer = compose(standard, PlayerOptions::new().plugin(plugin("mine")));

        assert_eq!(names(&consumer), vec!["theme", "autoPart", "mine"]);
        assert!(consumer.auto_part);
    }

    #[test]
    fn test_option_blocks_merge() {
        let base = PlayerConfig {
            options: PluginOptions::new().with("hotkeys", json!({ "seekStep": 5, "enabled": true })),
            ..Default::default()
        };
        let config = compose(base, PlayerOptions::new().option("hotkeys", json!({ "seekStep": 10 })));
        assert_eq!(
            config.options.raw("hotkeys"),
            Some(&json!({ "seekStep": 10, "enabled": true }))
        );
    }

    #[test]
    fn test_options_from_json() {
        let options: PlayerOptions = serde_json::from_value(json!({
            "autoPart": true,
            "autoPlay": false,
            "themeColor": "#123456",
            "options": { "hotkeys": { "enabled": false } }
        }))
        .unwrap();

        assert_eq!(options.auto_part, Some(true));
        assert_eq!(options.auto_play, Some(false));
        assert_eq!(options.theme_color.as_deref(), Some("#123456"));
        assert!(options.video.is_none());
        assert!(options.plugins.is_empty());
    }
}
