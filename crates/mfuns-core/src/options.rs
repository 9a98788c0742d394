//! Per-plugin option blocks
//!
//! Every feature owns one namespace in the player options. Blocks are kept
//! as raw JSON until the owning plugin asks for its typed view.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed options block owned by a single feature
pub trait OptionsBlock: DeserializeOwned + Default {
    /// Key of the block inside the player options
    const NAMESPACE: &'static str;

    /// Semantic checks beyond what deserialization enforces
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Raw option blocks keyed by namespace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginOptions(BTreeMap<String, serde_json::Value>);

impl PluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw block, replacing any previous value
    pub fn insert(&mut self, namespace: impl Into<String>, value: serde_json::Value) {
        self.0.insert(namespace.into(), value);
    }

    /// Builder form of [`PluginOptions::insert`]
    pub fn with(mut self, namespace: impl Into<String>, value: serde_json::Value) -> Self {
        self.insert(namespace, value);
        self
    }

    /// Store a typed block
    pub fn set<T: OptionsBlock + Serialize>(&mut self, block: &T) -> Result<()> {
        self.0.insert(T::NAMESPACE.to_string(), serde_json::to_value(block)?);
        Ok(())
    }

    pub fn raw(&self, namespace: &str) -> Option<&serde_json::Value> {
        self.0.get(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Typed view of a block. Missing blocks yield the default.
    pub fn block<T: OptionsBlock>(&self) -> Result<T> {
        let block = match self.0.get(T::NAMESPACE) {
            None | Some(serde_json::Value::Null) => T::default(),
            Some(value) => T::deserialize(value).map_err(|e| Error::InvalidOption {
                namespace: T::NAMESPACE.to_string(),
                reason: e.to_string(),
            })?,
        };
        block.validate().map_err(|reason| Error::InvalidOption {
            namespace: T::NAMESPACE.to_string(),
            reason,
        })?;
        Ok(block)
    }

    /// Overlay `other` on top of `self`. Object blocks merge key by key,
    /// anything else is replaced.
    pub fn merge(mut self, other: PluginOptions) -> Self {
        for (namespace, value) in other.0 {
            let slot = self.0.entry(namespace).or_insert(serde_json::Value::Null);
            match (slot, value) {
                (serde_json::Value::Object(base), serde_json::Value::Object(over)) => {
                    base.extend(over);
                }
                (slot, value) => *slot = value,
            }
        }
        self
    }
}
