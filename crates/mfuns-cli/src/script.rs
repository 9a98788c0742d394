//! Playback scripts
//!
//! A script is a comma separated list of steps, e.g.
//! `play,seek:30,webfull,fullscreen,ended`.

use anyhow::{anyhow, bail, Context};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Play,
    Pause,
    Toggle,
    Seek(f64),
    /// Let the decoder run for some seconds
    Tick(f64),
    Part(usize),
    /// Pick a part through the part list panel
    Select(usize),
    Next,
    Prev,
    Volume(f64),
    Rate(f64),
    Loop(bool),
    Mute(bool),
    Fullscreen(bool),
    Webfull(bool),
    Pip(bool),
    /// Jump to the end of the current part
    Ended,
    Key(String),
    Click(String),
    Open(String),
    Wait(u64),
    Destroy,
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let step = match (name, arg) {
            ("play", None) => Step::Play,
            ("pause", None) => Step::Pause,
            ("toggle", None) => Step::Toggle,
            ("seek", Some(t)) => Step::Seek(number(name, t)?),
            ("tick", Some(t)) => Step::Tick(number(name, t)?),
            ("part", Some(n)) => Step::Part(number(name, n)?),
            ("select", Some(n)) => Step::Select(number(name, n)?),
            ("next", None) => Step::Next,
            ("prev", None) => Step::Prev,
            ("volume", Some(v)) => Step::Volume(number(name, v)?),
            ("rate", Some(r)) => Step::Rate(number(name, r)?),
            ("loop", None) => Step::Loop(true),
            ("loop_off", None) => Step::Loop(false),
            ("mute", None) => Step::Mute(true),
            ("unmute", None) => Step::Mute(false),
            ("fullscreen", None) => Step::Fullscreen(true),
            ("exit_fullscreen", None) => Step::Fullscreen(false),
            ("webfull", None) => Step::Webfull(true),
            ("exit_webfull", None) => Step::Webfull(false),
            ("pip", None) => Step::Pip(true),
            ("exit_pip", None) => Step::Pip(false),
            ("ended", None) => Step::Ended,
            ("key", Some(k)) if !k.is_empty() => Step::Key(k.to_string()),
            ("click", Some(c)) if !c.is_empty() => Step::Click(c.to_string()),
            ("open", Some(p)) if !p.is_empty() => Step::Open(p.to_string()),
            ("wait", Some(ms)) => Step::Wait(number(name, ms)?),
            ("destroy", None) => Step::Destroy,
            _ => bail!("unknown step '{}'", s),
        };
        Ok(step)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |flag: bool, on: &str, off: &str| (if flag { on } else { off }).to_string();
        let text = match self {
            Step::Play => "play".to_string(),
            Step::Pause => "pause".to_string(),
            Step::Toggle => "toggle".to_string(),
            Step::Seek(t) => format!("seek:{}", t),
            Step::Tick(t) => format!("tick:{}", t),
            Step::Part(n) => format!("part:{}", n),
            Step::Select(n) => format!("select:{}", n),
            Step::Next => "next".to_string(),
            Step::Prev => "prev".to_string(),
            Step::Volume(v) => format!("volume:{}", v),
            Step::Rate(r) => format!("rate:{}", r),
            Step::Loop(flag) => on_off(*flag, "loop", "loop_off"),
            Step::Mute(flag) => on_off(*flag, "mute", "unmute"),
            Step::Fullscreen(flag) => on_off(*flag, "fullscreen", "exit_fullscreen"),
            Step::Webfull(flag) => on_off(*flag, "webfull", "exit_webfull"),
            Step::Pip(flag) => on_off(*flag, "pip", "exit_pip"),
            Step::Ended => "ended".to_string(),
            Step::Key(k) => format!("key:{}", k),
            Step::Click(c) => format!("click:{}", c),
            Step::Open(p) => format!("open:{}", p),
            Step::Wait(ms) => format!("wait:{}", ms),
            Step::Destroy => "destroy".to_string(),
        };
        f.write_str(&text)
    }
}

fn number<T: FromStr>(step: &str, arg: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    arg.trim()
        .parse()
        .with_context(|| format!("invalid argument '{}' for '{}'", arg, step))
}

/// Parse a whole script. Empty input is an empty script.
pub fn parse(script: &str) -> anyhow::Result<Vec<Step>> {
    script
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .enumerate()
        .map(|(i, s)| s.parse::<Step>().map_err(|e| anyhow!("step {}: {}", i + 1, e)))
        .collect()
}
