//! Panels

mod about;
mod hotkeys;
mod part_list;

pub use about::{About, AboutInfo};
pub use hotkeys::{HotkeyAction, Hotkeys, HotkeysOptions};
pub use part_list::{PartEntry, PartList};
