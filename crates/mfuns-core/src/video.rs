//! Video capability
//!
//! The player drives media playback through the [`Video`] trait only. The
//! browser build wraps a media element; [`HeadlessVideo`] keeps the same
//! state in memory for tests and the CLI.

use crate::{lock, Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One playable source of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

/// One part (episode) of a multi-part video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPart {
    #[serde(default)]
    pub title: String,
    /// Length in seconds, when known ahead of loading
    #[serde(default)]
    pub duration: Option<f64>,
    pub src: Vec<VideoSource>,
}

impl VideoPart {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration: None,
            src: vec![VideoSource {
                url: url.into(),
                quality: None,
            }],
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Video options block of the player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoOptions {
    pub list: Vec<VideoPart>,
    /// 1-based part to load first
    pub part: usize,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            part: 1,
        }
    }
}

/// Notifications raised by the underlying media element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    Ended,
    TimeUpdate,
    VolumeChange,
    RateChange,
}

/// Playback primitives
pub trait Video: Send + Sync {
    /// Load a 1-based part
    fn set_part(&self, part: usize, autoplay: bool) -> Result<()>;
    fn play(&self);
    fn pause(&self);
    fn seek(&self, time: f64);
    fn set_volume(&self, volume: f64);
    fn set_rate(&self, rate: f64);
    fn set_loop(&self, flag: bool);
    fn mute(&self, flag: bool);

    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn paused(&self) -> bool;
    fn muted(&self) -> bool;
    fn rate(&self) -> f64;
    fn volume(&self) -> f64;
    fn looped(&self) -> bool;
    /// Buffered `(start, end)` ranges in seconds
    fn buffered(&self) -> Vec<(f64, f64)>;
    fn part(&self) -> usize;
    fn part_count(&self) -> usize;
}

#[derive(Debug)]
struct MediaState {
    parts: Vec<VideoPart>,
    part: usize,
    current_time: f64,
    duration: f64,
    paused: bool,
    muted: bool,
    rate: f64,
    volume: f64,
    looped: bool,
}

/// In-memory video used when no media element exists
#[derive(Debug)]
pub struct HeadlessVideo {
    state: Mutex<MediaState>,
}

impl HeadlessVideo {
    pub fn new(options: &VideoOptions) -> Self {
        let part = options.part.max(1);
        let duration = options
            .list
            .get(part - 1)
            .and_then(|p| p.duration)
            .unwrap_or(0.0);

        Self {
            state: Mutex::new(MediaState {
                parts: options.list.clone(),
                part,
                current_time: 0.0,
                duration,
                paused: true,
                muted: false,
                rate: 1.0,
                volume: 1.0,
                looped: false,
            }),
        }
    }

    /// Move the playhead as a decoder would
    pub fn advance(&self, seconds: f64) {
        let mut state = lock(&self.state);
        state.current_time = (state.current_time + seconds * state.rate).min(state.duration);
    }

    /// Whether the playhead reached the end of the part
    pub fn is_ended(&self) -> bool {
        let state = lock(&self.state);
        state.duration > 0.0 && state.current_time >= state.duration
    }
}

impl Default for HeadlessVideo {
    fn default() -> Self {
        Self::new(&VideoOptions::default())
    }
}

impl Video for HeadlessVideo {
    fn set_part(&self, part: usize, autoplay: bool) -> Result<()> {
        let mut state = lock(&self.state);
        let count = state.parts.len();
        if part == 0 || part > count {
            return Err(Error::InvalidPart { part, count });
        }
        state.part = part;
        state.duration = state.parts[part - 1].duration.unwrap_or(0.0);
        state.current_time = 0.0;
        state.paused = !autoplay;
        Ok(())
    }

    fn play(&self) {
        lock(&self.state).paused = false;
    }

    fn pause(&self) {
        lock(&self.state).paused = true;
    }

    fn seek(&self, time: f64) {
        let mut state = lock(&self.state);
        state.current_time = time.clamp(0.0, state.duration.max(0.0));
    }

    fn set_volume(&self, volume: f64) {
        lock(&self.state).volume = volume.clamp(0.0, 1.0);
    }

    fn set_rate(&self, rate: f64) {
        lock(&self.state).rate = rate;
    }

    fn set_loop(&self, flag: bool) {
        lock(&self.state).looped = flag;
    }

    fn mute(&self, flag: bool) {
        lock(&self.state).muted = flag;
    }

    fn current_time(&self) -> f64 {
        lock(&self.state).current_time
    }

    fn duration(&self) -> f64 {
        lock(&self.state).duration
    }

    fn paused(&self) -> bool {
        lock(&self.state).paused
    }

    fn muted(&self) -> bool {
        lock(&self.state).muted
    }

    fn rate(&self) -> f64 {
        lock(&self.state).rate
    }

    fn volume(&self) -> f64 {
        lock(&self.state).volume
    }

    fn looped(&self) -> bool {
        lock(&self.state).looped
    }

    fn buffered(&self) -> Vec<(f64, f64)> {
        let state = lock(&self.state);
        if state.duration > 0.0 {
            vec![(0.0, state.duration)]
        } else {
            Vec::new()
        }
    }

    fn part(&self) -> usize {
        lock(&self.state).part
    }

    fn part_count(&self) -> usize {
        lock(&self.state).parts.len()
    }
}
