//! About panel

use mfuns_core::{Component, Entry, Panel, PanelDescriptor, Player, PlayerId, Result, VERSION};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    pub version: String,
    pub player_id: PlayerId,
    pub plugins: Vec<String>,
}

pub struct About {
    info: Mutex<Option<AboutInfo>>,
}

impl About {
    pub const NAME: &'static str = "about";

    pub fn new() -> Self {
        Self {
            info: Mutex::new(None),
        }
    }

    pub fn descriptor() -> PanelDescriptor {
        PanelDescriptor::new(
            Self::NAME,
            Entry::factory(|_| Arc::new(About::new()) as Arc<dyn Panel>),
        )
    }

    /// Filled in once the panel is mounted
    pub fn info(&self) -> Option<AboutInfo> {
        self.info.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for About {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for About {
    // Panels mount after every plugin, so the plugin list is complete here
    fn mounted(&self, player: &Player) -> Result<()> {
        let info = AboutInfo {
            version: VERSION.to_string(),
            player_id: player.id(),
            plugins: player.plugins().names(),
        };
        *self.info.lock().unwrap_or_else(PoisonError::into_inner) = Some(info);
        Ok(())
    }
}

impl Panel for About {
    fn title(&self) -> String {
        "About".to_string()
    }

    fn open(&self, player: &Player) -> Result<()> {
        info!(player_id = %player.id(), version = VERSION, "About panel opened");
        Ok(())
    }
}
