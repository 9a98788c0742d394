//! Part list panel
//!
//! Lists the parts of a multi-part video and switches between them. With
//! fewer than two parts there is nothing to pick, so the panel stays
//! installed but hidden.

use mfuns_core::{Component, Entry, HookOutcome, Panel, PanelDescriptor, Player, PlayerRef, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// One row of the list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartEntry {
    /// 1-based
    pub part: usize,
    pub title: String,
    pub current: bool,
}

pub struct PartList {
    player: PlayerRef,
    hidden: AtomicBool,
}

impl PartList {
    pub const NAME: &'static str = "partList";

    pub fn new(player: &PlayerRef) -> Self {
        Self {
            player: player.clone(),
            hidden: AtomicBool::new(false),
        }
    }

    pub fn descriptor() -> PanelDescriptor {
        PanelDescriptor::new(
            Self::NAME,
            Entry::factory(|player| Arc::new(PartList::new(player)) as Arc<dyn Panel>),
        )
    }

    pub fn entries(&self) -> Result<Vec<PartEntry>> {
        let player = self.player.upgrade()?;
        let current = player.video().part();
        Ok(player
            .config()
            .video
            .list
            .iter()
            .enumerate()
            .map(|(i, part)| PartEntry {
                part: i + 1,
                title: part.title.clone(),
                current: i + 1 == current,
            })
            .collect())
    }

    /// Load `part` and play it, subject to `beforePartChange`
    pub async fn select(&self, part: usize) -> Result<HookOutcome> {
        let player = self.player.upgrade()?;
        player.set_part(part, true).await
    }
}

impl Component for PartList {
    fn init(&self, player: &Player) -> Result<()> {
        self.hidden.store(player.video().part_count() < 2, Ordering::SeqCst);
        Ok(())
    }

    fn is_ignored(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }
}

impl Panel for PartList {
    fn title(&self) -> String {
        "Parts".to_string()
    }

    fn open(&self, player: &Player) -> Result<()> {
        let entries = self.entries()?;
        info!(
            player_id = %player.id(),
            parts = entries.len(),
            current = player.video().part(),
            "Part list opened"
        );
        Ok(())
    }
}
