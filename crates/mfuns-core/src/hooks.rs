//! Hook pipeline
//!
//! A hook is a named interception point. Handlers registered under a hook
//! run strictly one after another; the first handler that accepts or
//! rejects ends the pipeline. When nobody decides, the outcome is
//! [`HookOutcome::Accepted`].
//!
//! Handler errors are not caught: they are logged and propagated to the
//! caller of [`HookPipeline::invoke`], which decides how to recover.

use crate::{lock, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Maximum nesting of one hook inside a single call chain
pub const MAX_HOOK_DEPTH: usize = 8;

type Depths = HashMap<HookName, usize>;

tokio::task_local! {
    /// Hooks currently running in this call chain and how deeply each is nested
    static CHAIN: Depths;
}

/// Hook identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookName {
    BeforePlay,
    BeforePause,
    BeforeSeek,
    BeforePartChange,
    BeforeDestroy,
    /// Plugin-defined hook
    Custom(String),
}

impl std::fmt::Display for HookName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookName::BeforePlay => write!(f, "beforePlay"),
            HookName::BeforePause => write!(f, "beforePause"),
            HookName::BeforeSeek => write!(f, "beforeSeek"),
            HookName::BeforePartChange => write!(f, "beforePartChange"),
            HookName::BeforeDestroy => write!(f, "beforeDestroy"),
            HookName::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Value shared with every handler of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HookContext {
    None,
    Seek { from: f64, to: f64 },
    Part { from: usize, to: usize },
    Custom { data: serde_json::Value },
}

/// A single handler's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookVerdict {
    /// No opinion, keep going
    #[default]
    Continue,
    /// Stop, operation may proceed
    Accept,
    /// Stop, operation must not proceed
    Reject,
}

impl From<bool> for HookVerdict {
    fn from(value: bool) -> Self {
        if value {
            HookVerdict::Accept
        } else {
            HookVerdict::Reject
        }
    }
}

impl From<Option<bool>> for HookVerdict {
    fn from(value: Option<bool>) -> Self {
        value.map(HookVerdict::from).unwrap_or_default()
    }
}

/// Result of a whole invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookOutcome {
    Accepted,
    Rejected,
}

impl HookOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, HookOutcome::Accepted)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, HookOutcome::Rejected)
    }
}

/// A participant in a hook
#[async_trait]
pub trait HookHandler: Send + Sync {
    async fn call(&self, ctx: &HookContext) -> Result<HookVerdict>;
}

/// Shared handler; the `Arc` is the identity used for unregistering
pub type SharedHook = Arc<dyn HookHandler>;

struct FnHook<F>(F);

#[async_trait]
impl<F, Fut> HookHandler for FnHook<F>
where
    F: Fn(HookContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HookVerdict>> + Send,
{
    async fn call(&self, ctx: &HookContext) -> Result<HookVerdict> {
        (self.0)(ctx.clone()).await
    }
}

/// Wrap an async closure as a hook handler
pub fn hook_fn<F, Fut>(f: F) -> SharedHook
where
    F: Fn(HookContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HookVerdict>> + Send + 'static,
{
    Arc::new(FnHook(f))
}

/// Ordered handler lists keyed by hook name
#[derive(Default)]
pub struct HookPipeline {
    hooks: Mutex<HashMap<HookName, Vec<SharedHook>>>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. `before` puts it at the front of the list.
    pub fn register(&self, name: HookName, handler: SharedHook, before: bool) {
        let mut hooks = lock(&self.hooks);
        let list = hooks.entry(name).or_default();
        if before {
            list.insert(0, handler);
        } else {
            list.push(handler);
        }
    }

    /// Remove the first occurrence of `handler`. Absent handlers are ignored.
    pub fn unregister(&self, name: &HookName, handler: &SharedHook) {
        let mut hooks = lock(&self.hooks);
        if let Some(list) = hooks.get_mut(name) {
            if let Some(index) = list.iter().position(|h| Arc::ptr_eq(h, handler)) {
                list.remove(index);
            }
        }
    }

    /// Number of handlers registered under `name`
    pub fn handler_count(&self, name: &HookName) -> usize {
        lock(&self.hooks).get(name).map(Vec::len).unwrap_or(0)
    }

    /// Run the handlers of `name` in order until one decides.
    ///
    /// Nesting is counted per call chain: an `invoke` reached from inside a
    /// handler of the same hook is one level deeper, while independent
    /// invocations interleaving at await points each start at zero.
    pub async fn invoke(&self, name: HookName, ctx: HookContext) -> Result<HookOutcome> {
        let mut depths = CHAIN.try_with(Depths::clone).unwrap_or_default();
        let depth = depths.entry(name.clone()).or_insert(0);
        if *depth >= MAX_HOOK_DEPTH {
            warn!(hook = %name, depth = *depth, "Hook recursion limit reached");
            return Err(Error::HookRecursion {
                hook: name.to_string(),
                depth: *depth,
            });
        }
        *depth += 1;

        CHAIN.scope(depths, self.dispatch(name, ctx)).await
    }

    async fn dispatch(&self, name: HookName, ctx: HookContext) -> Result<HookOutcome> {
        // The list is fixed for the duration of this invocation
        let handlers = lock(&self.hooks).get(&name).cloned().unwrap_or_default();

        for (position, handler) in handlers.iter().enumerate() {
            let verdict = handler.call(&ctx).await.inspect_err(|e| {
                warn!(hook = %name, position, error = %e, "Hook handler failed");
            })?;

            match verdict {
                HookVerdict::Continue => {}
                HookVerdict::Accept => {
                    debug!(hook = %name, position, "Hook accepted early");
                    return Ok(HookOutcome::Accepted);
                }
                HookVerdict::Reject => {
                    debug!(hook = %name, position, "Hook rejected");
                    return Ok(HookOutcome::Rejected);
                }
            }
        }

        debug!(hook = %name, handlers = handlers.len(), "Hook completed");
        Ok(HookOutcome::Accepted)
    }

    /// Remove every handler
    pub fn clear(&self) {
        lock(&self.hooks).clear();
    }
}

impl std::fmt::Debug for HookPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hooks = lock(&self.hooks).len();
        f.debug_struct("HookPipeline").field("hooks", &hooks).finish()
    }
}
