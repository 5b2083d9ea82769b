//! Namespaced environment-variable stores.
//!
//! An [`EnvStore`] holds named groups ("namespaces") of key/value entries.
//! A store can be populated standalone (the global store) or scoped against a
//! parent store (a server store scoped against global): parent keys the child
//! does not define remain visible through [`EnvStore::lookup`] but are never
//! emitted by [`EnvStore::export_dict`]. Merging two stores is a pure
//! operation that always produces a new owned store.

use crate::error::{Result, StackError};
use serde_json::Value;
use std::collections::BTreeMap;

/// Conflict-resolution rule for a key present with different values in both
/// stores being merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Keep the first store's value (default).
    #[default]
    Preserve,
    /// Take the second store's value.
    Override,
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergePolicy::Preserve => write!(f, "preserve"),
            MergePolicy::Override => write!(f, "override"),
        }
    }
}

/// One named group of entries.
///
/// Own entries are what this namespace defines itself; inherited entries are
/// a snapshot of the parent namespace's values for keys the child does not
/// shadow, taken when the namespace was added.
#[derive(Debug, Clone, Default)]
struct Namespace {
    entries: BTreeMap<String, Value>,
    inherited: BTreeMap<String, Value>,
}

/// A scoped collection of environment namespaces.
#[derive(Debug, Clone, Default)]
pub struct EnvStore {
    namespaces: BTreeMap<String, Namespace>,
}

impl EnvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entries` under namespace `name`.
    ///
    /// If the namespace already exists, entries are merged into it with
    /// last-write-wins. Fails with [`StackError::InvalidEntries`] if
    /// `entries` is not a mapping.
    pub fn add_namespace(&mut self, name: &str, entries: Value) -> Result<()> {
        self.insert_entries(name, entries, None)
    }

    /// Register `entries` under namespace `name`, scoped against `parent`.
    ///
    /// Keys present in the parent's same-named namespace that `entries` does
    /// not define become inherited values: visible through [`EnvStore::lookup`]
    /// but never exported. The parent is only read, never mutated.
    pub fn add_namespace_scoped(
        &mut self,
        name: &str,
        entries: Value,
        parent: &EnvStore,
    ) -> Result<()> {
        self.insert_entries(name, entries, Some(parent))
    }

    fn insert_entries(&mut self, name: &str, entries: Value, parent: Option<&EnvStore>) -> Result<()> {
        let entries = match entries {
            Value::Object(map) => map,
            other => {
                return Err(StackError::InvalidEntries {
                    namespace: name.to_string(),
                    reason: format!("expected a key/value mapping, got {}", type_name(&other)),
                });
            }
        };

        let namespace = self.namespaces.entry(name.to_string()).or_default();
        for (key, value) in entries {
            // An own key shadows any inherited value of the same name.
            namespace.inherited.remove(&key);
            namespace.entries.insert(key, value);
        }

        if let Some(parent) = parent
            && let Some(parent_ns) = parent.namespaces.get(name)
        {
            for (key, value) in parent_ns.entries.iter().chain(&parent_ns.inherited) {
                if !namespace.entries.contains_key(key) {
                    namespace.inherited.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(())
    }

    /// Names of the namespaces defined in this store, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        self.namespaces.keys().map(String::as_str).collect()
    }

    /// Whether this store defines any namespace.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Look up a key, falling back to the value inherited from the parent
    /// scope when the namespace does not define it.
    pub fn lookup(&self, namespace: &str, key: &str) -> Option<&Value> {
        let ns = self.namespaces.get(namespace)?;
        ns.entries.get(key).or_else(|| ns.inherited.get(key))
    }

    /// Export as a plain nested mapping `{namespace: {key: value}}`.
    ///
    /// Only own entries are emitted; inherited values stay with the parent
    /// store that owns them.
    pub fn export_dict(&self) -> Value {
        let mut out = serde_json::Map::new();
        for (name, ns) in &self.namespaces {
            let entries: serde_json::Map<String, Value> =
                ns.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            out.insert(name.clone(), Value::Object(entries));
        }
        Value::Object(out)
    }

    /// Merge two stores into a new one under `policy`.
    ///
    /// Namespaces present in both operands are merged key-by-key:
    /// [`MergePolicy::Preserve`] keeps `store1`'s value on conflict,
    /// [`MergePolicy::Override`] takes `store2`'s. One-sided namespaces and
    /// keys are deep-copied. Neither operand is mutated, and the result
    /// aliases nothing: merging with an empty second operand is an identity
    /// deep copy. The result is flat -- inherited scoping context does not
    /// survive a merge.
    pub fn merge(store1: &EnvStore, store2: &EnvStore, policy: MergePolicy) -> EnvStore {
        let mut merged = EnvStore::new();
        for (name, ns1) in &store1.namespaces {
            let mut entries = ns1.entries.clone();
            if let Some(ns2) = store2.namespaces.get(name) {
                for (key, value) in &ns2.entries {
                    match policy {
                        MergePolicy::Preserve => {
                            entries.entry(key.clone()).or_insert_with(|| value.clone());
                        }
                        MergePolicy::Override => {
                            entries.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            merged.namespaces.insert(
                name.clone(),
                Namespace { entries, inherited: BTreeMap::new() },
            );
        }
        for (name, ns2) in &store2.namespaces {
            if !store1.namespaces.contains_key(name) {
                merged.namespaces.insert(
                    name.clone(),
                    Namespace { entries: ns2.entries.clone(), inherited: BTreeMap::new() },
                );
            }
        }
        merged
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
