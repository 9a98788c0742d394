//! CLI command implementations

use crate::output::{format_output, Report};
use crate::script::{self, Step};
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use mfuns_core::{
    Component, ConfigSummary, Entry, EventPayload, HeadlessVideo, HookOutcome, MediaEvent, Mode,
    ModeState, Player, PlayerConfig, PlayerEvent, Plugin, PluginDescriptor, Result as CoreResult,
    Video, VERSION,
};
use mfuns_plugins::{catalog, ConfigFile, Hotkeys, PartList, Preset};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Time given to tasks spawned by event handlers (auto part, hotkeys) to finish
const SETTLE: Duration = Duration::from_millis(20);

/// Read a config file (if any) and compose it against a preset
pub fn load_config(path: Option<&Path>, preset: Option<Preset>) -> anyhow::Result<PlayerConfig> {
    let file = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            ConfigFile::from_json(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => ConfigFile::default(),
    };
    Ok(file.compose(preset)?)
}

// =============================================================================
// config
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigReport {
    preset: String,
    #[serde(flatten)]
    config: ConfigSummary,
}

impl Report for ConfigReport {
    fn text(&self) -> String {
        let c = &self.config;
        let list = |items: &[String]| {
            if items.is_empty() {
                "-".to_string()
            } else {
                items.join(", ")
            }
        };
        let mut out = vec![
            format!("Preset:      {}", self.preset),
            format!("Plugins:     {}", list(&c.plugins)),
            format!("Controls:    {}", list(&c.controls)),
            format!("Panels:      {}", list(&c.panels)),
            format!("Auto part:   {}", c.auto_part),
            format!("Auto play:   {}", c.auto_play),
            format!("Theme color: {}", c.theme_color),
            format!("Parts:       {}", c.video.list.len()),
        ];
        for (i, part) in c.video.list.iter().enumerate() {
            let url = part.src.first().map(|s| s.url.as_str()).unwrap_or("-");
            out.push(format!("  {}. {} ({})", i + 1, part.title, url));
        }
        let namespaces: Vec<String> = c.options.namespaces().map(str::to_string).collect();
        out.push(format!("Options:     {}", list(&namespaces)));
        out.join("\n")
    }
}

/// Print the composed configuration
pub fn config(path: Option<&Path>, preset: Option<Preset>, format: &str) -> anyhow::Result<()> {
    let config = load_config(path, preset)?;
    let report = ConfigReport {
        preset: preset.map(|p| p.to_string()).unwrap_or_else(|| "from file".to_string()),
        config: config.summary(),
    };
    println!("{}", format_output(&report, format)?);
    Ok(())
}

// =============================================================================
// presets
// =============================================================================

#[derive(Serialize)]
struct PresetsReport {
    presets: Vec<(String, ConfigSummary)>,
    plugins: Vec<&'static str>,
    controls: Vec<&'static str>,
    panels: Vec<&'static str>,
}

impl Report for PresetsReport {
    fn text(&self) -> String {
        let mut out = vec!["Presets:".to_string()];
        for (name, summary) in &self.presets {
            out.push(format!("  {}", name));
            out.push(format!("    plugins:  {}", summary.plugins.join(", ")));
            out.push(format!("    controls: {}", summary.controls.join(", ")));
            out.push(format!("    panels:   {}", summary.panels.join(", ")));
            out.push(format!("    autoPart: {}", summary.auto_part));
            out.push(format!("    autoPlay: {}", summary.auto_play));
        }
        out.push(String::new());
        out.push("Built-in components:".to_string());
        out.push(format!("  plugins:  {}", self.plugins.join(", ")));
        out.push(format!("  controls: {}", self.controls.join(", ")));
        out.push(format!("  panels:   {}", self.panels.join(", ")));
        out.join("\n")
    }
}

/// List presets and the component names a config file may use
pub fn presets(format: &str) -> anyhow::Result<()> {
    let report = PresetsReport {
        presets: Preset::ALL
            .iter()
            .map(|p| (p.to_string(), p.base().summary()))
            .collect(),
        plugins: catalog::PLUGINS.to_vec(),
        controls: catalog::CONTROLS.to_vec(),
        panels: catalog::PANELS.to_vec(),
    };
    println!("{}", format_output(&report, format)?);
    Ok(())
}

// =============================================================================
// run
// =============================================================================

/// One event observed while the script ran. Step 0 is construction.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub at: DateTime<Utc>,
    pub step: usize,
    pub event: PlayerEvent,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub result: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub version: &'static str,
    pub player_id: String,
    pub steps: Vec<StepRecord>,
    pub events: Vec<EventRecord>,
    pub part: usize,
    pub current_time: f64,
    pub paused: bool,
    pub modes: ModeState,
}

impl Report for RunReport {
    fn text(&self) -> String {
        let mut out = vec![format!("Player {} (mfuns {})", self.player_id, self.version)];

        out.push("\nSteps:".to_string());
        for (i, step) in self.steps.iter().enumerate() {
            out.push(format!("  {:>2}. {:<20} {}", i + 1, step.step, step.result));
        }

        out.push("\nEvents:".to_string());
        for record in &self.events {
            out.push(format!(
                "  {}  [{:>2}] {:<20} {}",
                record.at.format("%H:%M:%S%.3f"),
                record.step,
                record.event,
                describe_payload(&record.payload)
            ));
        }

        let modes: Vec<&str> = [
            (self.modes.fullscreen, "fullscreen"),
            (self.modes.webfull, "webfull"),
            (self.modes.pip, "pip"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();

        out.push(format!(
            "\nFinal: part {} at {:.1}s, {}, modes: {}",
            self.part,
            self.current_time,
            if self.paused { "paused" } else { "playing" },
            if modes.is_empty() { "none".to_string() } else { modes.join(", ") }
        ));
        out.join("\n")
    }
}

fn describe_payload(payload: &EventPayload) -> String {
    match payload {
        EventPayload::None => String::new(),
        EventPayload::Part(part) => format!("part {}", part),
        EventPayload::Time(t) => format!("{:.2}s", t),
        EventPayload::Volume(v) => format!("volume {:.2}", v),
        EventPayload::Rate(r) => format!("rate {}x", r),
        EventPayload::Color(c) => c.clone(),
        EventPayload::Key(key) => format!("key {:?}", key),
        EventPayload::Data(value) => value.to_string(),
    }
}

fn describe(outcome: HookOutcome) -> String {
    match outcome {
        HookOutcome::Accepted => "accepted".to_string(),
        HookOutcome::Rejected => "rejected".to_string(),
    }
}

fn changed(flag: bool) -> String {
    let text = if flag { "changed" } else { "unchanged" };
    text.to_string()
}

/// Records every built-in event. Installed ahead of the configured
/// plugins so construction-time events are captured too.
struct EventLog {
    records: Arc<Mutex<Vec<EventRecord>>>,
    step: Arc<AtomicUsize>,
}

impl EventLog {
    const NAME: &'static str = "eventLog";
}

impl Component for EventLog {
    fn init(&self, player: &Player) -> CoreResult<()> {
        for event in PlayerEvent::BUILTIN {
            let records = self.records.clone();
            let step = self.step.clone();
            let name = event.clone();
            player.on(event, move |payload| {
                let record = EventRecord {
                    at: Utc::now(),
                    step: step.load(Ordering::SeqCst),
                    event: name.clone(),
                    payload: payload.clone(),
                };
                debug!(event = %record.event, step = record.step, "Event");
                records
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .push(record);
            });
        }
        Ok(())
    }
}

impl Plugin for EventLog {}

/// Drives a player built on a headless video through a script
pub struct Runner {
    player: Arc<Player>,
    video: Arc<HeadlessVideo>,
    records: Arc<Mutex<Vec<EventRecord>>>,
    step: Arc<AtomicUsize>,
}

impl Runner {
    pub fn new(mut config: PlayerConfig) -> anyhow::Result<Self> {
        let records = Arc::new(Mutex::new(Vec::new()));
        let step = Arc::new(AtomicUsize::new(0));

        let (r, s) = (records.clone(), step.clone());
        let log = Entry::factory(move |_| {
            Arc::new(EventLog {
                records: r.clone(),
                step: s.clone(),
            }) as Arc<dyn Plugin>
        });
        config
            .plugins
            .insert(0, PluginDescriptor::new(EventLog::NAME, log));

        if config.video.list.is_empty() {
            warn!("No video parts configured");
        }
        let video = Arc::new(HeadlessVideo::new(&config.video));
        let player = Player::new(config, video.clone())?;
        info!(player_id = %player.id(), "Player ready");

        Ok(Self {
            player,
            video,
            records,
            step,
        })
    }

    /// Execute every step in order. A failing step aborts the run.
    pub async fn run(&self, steps: &[Step]) -> anyhow::Result<RunReport> {
        let mut results = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            self.step.store(i + 1, Ordering::SeqCst);
            let result = self
                .execute(step)
                .await
                .with_context(|| format!("Step {} ({}) failed", i + 1, step))?;
            debug!(step = %step, result = %result, "Step done");
            results.push(StepRecord {
                step: step.to_string(),
                result,
            });
            tokio::task::yield_now().await;
        }

        let events = self
            .records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Ok(RunReport {
            version: VERSION,
            player_id: self.player.id().to_string(),
            steps: results,
            events,
            part: self.video.part(),
            current_time: self.video.current_time(),
            paused: self.video.paused(),
            modes: self.player.mode_state(),
        })
    }

    async fn execute(&self, step: &Step) -> anyhow::Result<String> {
        let player = self.player.clone();
        let result = match step {
            Step::Play => self.playback(MediaEvent::Play, player.play().await?),
            Step::Pause => self.playback(MediaEvent::Pause, player.pause().await?),
            Step::Toggle => {
                let event = if self.video.paused() {
                    MediaEvent::Play
                } else {
                    MediaEvent::Pause
                };
                self.playback(event, player.toggle().await?)
            }
            Step::Seek(time) => describe(player.seek(*time).await?),
            Step::Tick(seconds) => {
                self.video.advance(*seconds);
                player.handle_media_event(MediaEvent::TimeUpdate);
                if self.video.is_ended() {
                    self.end().await
                } else {
                    format!("{:.1}s", self.video.current_time())
                }
            }
            Step::Part(part) => describe(player.set_part(*part, !self.video.paused()).await?),
            Step::Next => player.next().await?.map(describe).unwrap_or_else(|| "last part".into()),
            Step::Prev => player.prev().await?.map(describe).unwrap_or_else(|| "first part".into()),
            Step::Volume(volume) => {
                player.set_volume(*volume);
                player.handle_media_event(MediaEvent::VolumeChange);
                format!("{:.2}", self.video.volume())
            }
            Step::Rate(rate) => {
                player.set_rate(*rate);
                player.handle_media_event(MediaEvent::RateChange);
                format!("{}x", self.video.rate())
            }
            Step::Loop(flag) => {
                player.set_loop(*flag);
                "ok".to_string()
            }
            Step::Mute(flag) => {
                player.mute(*flag);
                player.handle_media_event(MediaEvent::VolumeChange);
                "ok".to_string()
            }
            Step::Fullscreen(flag) => self.mode(Mode::Fullscreen, *flag),
            Step::Webfull(flag) => self.mode(Mode::Webfull, *flag),
            Step::Pip(flag) => self.mode(Mode::Pip, *flag),
            Step::Ended => {
                self.video.seek(self.video.duration());
                self.end().await
            }
            Step::Key(key) => {
                if !player.panels().contains(Hotkeys::NAME) {
                    bail!("The '{}' panel is not installed", Hotkeys::NAME);
                }
                player.press_key(key);
                tokio::time::sleep(SETTLE).await;
                "sent".to_string()
            }
            Step::Select(part) => {
                let list = player
                    .panels()
                    .get_as::<PartList>(PartList::NAME)
                    .with_context(|| format!("No visible panel '{}'", PartList::NAME))?;
                describe(list.select(*part).await?)
            }
            Step::Click(name) => {
                let control = player
                    .controls()
                    .get(name.as_str())?
                    .with_context(|| format!("No visible control '{}'", name))?;
                control.activate(&player)?;
                "ok".to_string()
            }
            Step::Open(name) => {
                let panel = player
                    .panels()
                    .get(name.as_str())?
                    .with_context(|| format!("No visible panel '{}'", name))?;
                panel.open(&player)?;
                panel.title()
            }
            Step::Wait(ms) => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                "ok".to_string()
            }
            Step::Destroy => describe(player.destroy().await?),
        };
        Ok(result)
    }

    /// Mirror an accepted play/pause on the media element
    fn playback(&self, event: MediaEvent, outcome: HookOutcome) -> String {
        if outcome.is_accepted() {
            self.player.handle_media_event(event);
        }
        describe(outcome)
    }

    fn mode(&self, mode: Mode, enter: bool) -> String {
        let coordinator = self.player.mode();
        changed(if enter {
            coordinator.enter(mode)
        } else {
            coordinator.exit(mode)
        })
    }

    /// The playhead reached the end of the part
    async fn end(&self) -> String {
        if self.video.looped() {
            self.video.seek(0.0);
            self.player.handle_media_event(MediaEvent::TimeUpdate);
            return "looped".to_string();
        }
        self.player.handle_media_event(MediaEvent::Ended);
        tokio::time::sleep(SETTLE).await;
        format!("part {}", self.video.part())
    }
}

/// Build a player from config, run a script and print every event
pub async fn run(
    path: Option<&Path>,
    preset: Option<Preset>,
    script: &str,
    format: &str,
) -> anyhow::Result<()> {
    let steps = script::parse(script)?;
    let config = load_config(path, preset)?;
    let runner = Runner::new(config)?;
    let report = runner.run(&steps).await?;
    println!("{}", format_output(&report, format)?);
    Ok(())
}
