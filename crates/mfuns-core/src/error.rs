//! Error types for Mfuns Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lifecycle phase a component was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Ready,
    Mounted,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Init => write!(f, "init"),
            Phase::Ready => write!(f, "ready"),
            Phase::Mounted => write!(f, "mounted"),
        }
    }
}

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid options for '{namespace}': {reason}")]
    InvalidOption { namespace: String, reason: String },

    // Plugin errors
    #[error("Component '{name}' failed during {phase}: {reason}")]
    Lifecycle {
        name: String,
        phase: Phase,
        reason: String,
    },

    #[error("Plugin error: {0}")]
    Plugin(String),

    // Hook errors
    #[error("Hook '{hook}' failed: {reason}")]
    HookFailed { hook: String, reason: String },

    #[error("Hook '{hook}' re-entered too deeply (depth {depth})")]
    HookRecursion { hook: String, depth: usize },

    // Player errors
    #[error("Player has been dropped")]
    PlayerDropped,

    #[error("Player has been destroyed")]
    PlayerDestroyed,

    #[error("Invalid part {part} (video has {count} parts)")]
    InvalidPart { part: usize, count: usize },

    // Internal errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a plugin error
    pub fn plugin(msg: impl Into<String>) -> Self {
        Error::Plugin(msg.into())
    }

    /// Create a hook failure for the given hook
    pub fn hook(hook: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Error::HookFailed {
            hook: hook.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true if the player can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InvalidOption { .. }
                | Error::Plugin(_)
                | Error::HookFailed { .. }
                | Error::HookRecursion { .. }
                | Error::InvalidPart { .. }
        )
    }

    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::InvalidOption { .. } => "INVALID_OPTION",
            Error::Lifecycle { .. } => "LIFECYCLE",
            Error::Plugin(_) => "PLUGIN",
            Error::HookFailed { .. } => "HOOK_FAILED",
            Error::HookRecursion { .. } => "HOOK_RECURSION",
            Error::PlayerDropped => "PLAYER_DROPPED",
            Error::PlayerDestroyed => "PLAYER_DESTROYED",
            Error::InvalidPart { .. } => "INVALID_PART",
            Error::Json(_) => "JSON",
            Error::Io(_) => "IO",
        }
    }
}
