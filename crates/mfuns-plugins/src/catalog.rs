//! Name lookup for built-in components
//!
//! Lets a configuration file refer to components by name instead of
//! constructing descriptors in code.

use crate::controls::ModeButton;
use crate::panels::{About, Hotkeys, PartList};
use crate::presets::Preset;
use crate::{AutoPart, AutoPlay, Theme};
use mfuns_core::{
    ControlDescriptor, Error, PanelDescriptor, PlayerConfig, PlayerOptions, PluginDescriptor,
    Result,
};
use serde::Deserialize;
use tracing::debug;

pub const PLUGINS: [&str; 3] = [AutoPart::NAME, AutoPlay::NAME, Theme::NAME];
pub const CONTROLS: [&str; 3] = [ModeButton::FULLSCREEN, ModeButton::WEBFULL, ModeButton::PIP];
pub const PANELS: [&str; 3] = [About::NAME, Hotkeys::NAME, PartList::NAME];

pub fn plugin(name: &str) -> Result<PluginDescriptor> {
    match name {
        AutoPart::NAME => Ok(AutoPart::descriptor()),
        AutoPlay::NAME => Ok(AutoPlay::descriptor()),
        Theme::NAME => Ok(Theme::descriptor()),
        _ => Err(unknown("plugin", name)),
    }
}

pub fn control(name: &str) -> Result<ControlDescriptor> {
    match name {
        ModeButton::FULLSCREEN => Ok(ModeButton::fullscreen()),
        ModeButton::WEBFULL => Ok(ModeButton::webfull()),
        ModeButton::PIP => Ok(ModeButton::pip()),
        _ => Err(unknown("control", name)),
    }
}

pub fn panel(name: &str) -> Result<PanelDescriptor> {
    match name {
        About::NAME => Ok(About::descriptor()),
        Hotkeys::NAME => Ok(Hotkeys::descriptor()),
        PartList::NAME => Ok(PartList::descriptor()),
        _ => Err(unknown("panel", name)),
    }
}

fn unknown(kind: &str, name: &str) -> Error {
    Error::InvalidConfig(format!("unknown {} '{}'", kind, name))
}

/// Player configuration as written in a JSON file
///
/// ```json
/// {
///   "preset": "standard",
///   "plugins": ["theme"],
///   "themeColor": "#f69",
///   "options": { "hotkeys": { "seekStep": 10 } }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub preset: Option<Preset>,
    pub plugins: Vec<String>,
    pub controls: Vec<String>,
    pub panels: Vec<String>,
    #[serde(flatten)]
    pub options: PlayerOptions,
}

impl ConfigFile {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Resolve component names into consumer options
    pub fn into_options(self) -> Result<PlayerOptions> {
        let mut options = self.options;
        for name in &self.plugins {
            options = options.plugin(plugin(name)?);
        }
        for name in &self.controls {
            options = options.control(control(name)?);
        }
        for name in &self.panels {
            options = options.panel(panel(name)?);
        }
        Ok(options)
    }

    /// Compose against `preset`, or the file's own preset when `None`
    pub fn compose(self, preset: Option<Preset>) -> Result<PlayerConfig> {
        let preset = preset.or(self.preset).unwrap_or_default();
        debug!(%preset, "Composing configuration");
        Ok(preset.apply(self.into_options()?))
    }
}
