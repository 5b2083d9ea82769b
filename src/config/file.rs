//! The two-section deployment configuration document.
//!
//! A configuration file has at most two top-level sections:
//!
//! ```yaml
//! global:
//!   <namespace>: {KEY: value, ...}
//! services:
//!   <server>:
//!     <namespace>: {KEY: value, ...}
//! ```
//!
//! `global` namespaces are shared defaults; each server's namespaces are
//! scoped against the same-named global namespace. [`ConfigFile::load`]
//! builds the store tree, validates section names, and normalizes every
//! value to JSON-safe data up front.

use crate::config::normalize::{key_to_string, normalize};
use crate::config::store::{EnvStore, MergePolicy};
use crate::error::{Result, StackError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default name of the deployment configuration file.
pub const DEFAULT_CONFIG_FILENAME: &str = "stackenv.yml";

/// Recognized top-level sections of the configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    /// Environment namespaces shared across all servers.
    Global,
    /// Per-server environment namespaces.
    Services,
}

impl ConfigSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSection::Global => "global",
            ConfigSection::Services => "services",
        }
    }
}

impl std::fmt::Display for ConfigSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for ConfigSection {
    type Error = StackError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "global" => Ok(ConfigSection::Global),
            "services" => Ok(ConfigSection::Services),
            other => Err(StackError::UnknownConfigSection(other.to_string())),
        }
    }
}

/// A loaded deployment configuration: one global store plus one store per
/// server, each server store scoped against the global store.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    filename: String,
    global_envs: EnvStore,
    server_stores: BTreeMap<String, EnvStore>,
}

/// Create-or-get a server's store. All lazy creation of server stores goes
/// through here.
fn store_for_server<'a>(
    stores: &'a mut BTreeMap<String, EnvStore>,
    server: &str,
) -> &'a mut EnvStore {
    stores.entry(server.to_string()).or_default()
}

impl ConfigFile {
    /// An empty configuration: no global namespaces, no servers.
    ///
    /// This is the valid "no config" state, also used as the starting point
    /// for merge results.
    pub fn empty() -> Self {
        Self {
            path: PathBuf::from("."),
            filename: DEFAULT_CONFIG_FILENAME.to_string(),
            global_envs: EnvStore::new(),
            server_stores: BTreeMap::new(),
        }
    }

    /// Load a configuration file from `path`/`filename`.
    ///
    /// A missing file yields the empty configuration unless `file_must_exist`
    /// is set, in which case it is a [`StackError::MissingConfigFile`]. Any
    /// top-level key outside `global`/`services` fails with
    /// [`StackError::UnknownConfigSection`].
    pub fn load(path: impl AsRef<Path>, filename: &str, file_must_exist: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let filepath = path.join(filename);

        if !filepath.is_file() {
            if file_must_exist {
                return Err(StackError::MissingConfigFile {
                    path,
                    filename: filename.to_string(),
                });
            }
            debug!(path = %filepath.display(), "no configuration file, starting empty");
            return Ok(Self {
                path,
                filename: filename.to_string(),
                global_envs: EnvStore::new(),
                server_stores: BTreeMap::new(),
            });
        }

        let text = std::fs::read_to_string(&filepath)?;
        let raw: serde_yaml::Value = serde_yaml::from_str(&text)?;

        let mut global_envs = EnvStore::new();
        let mut server_stores: BTreeMap<String, EnvStore> = BTreeMap::new();

        let doc = match raw {
            // An empty file is a valid empty configuration.
            serde_yaml::Value::Null => serde_yaml::Mapping::new(),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => {
                return Err(StackError::InvalidDocument {
                    filename: filename.to_string(),
                    reason: "top-level document must be a mapping".to_string(),
                });
            }
        };

        // Validate every section name up front, and bucket the values so the
        // global section is always loaded before any server is scoped against
        // it, whatever order the document lists them in.
        let mut global_sections = Vec::new();
        let mut service_sections = Vec::new();
        for (key, value) in doc {
            let name = key_to_string(&key).map_err(|e| StackError::InvalidDocument {
                filename: filename.to_string(),
                reason: e.to_string(),
            })?;
            match ConfigSection::try_from(name.as_str())? {
                ConfigSection::Global => global_sections.push(value),
                ConfigSection::Services => service_sections.push(value),
            }
        }

        for section_value in global_sections {
            for (ns, entries) in namespace_pairs(filename, section_value)? {
                global_envs.add_namespace(&ns, entries)?;
            }
        }

        for section_value in service_sections {
            for (server, namespaces) in section_mapping(filename, section_value)? {
                let server = key_to_string(&server).map_err(|e| StackError::InvalidDocument {
                    filename: filename.to_string(),
                    reason: e.to_string(),
                })?;
                let pairs = namespace_pairs(filename, namespaces)?;
                // A server counts as declared only once it defines a namespace.
                if pairs.is_empty() {
                    continue;
                }
                let store = store_for_server(&mut server_stores, &server);
                for (ns, entries) in pairs {
                    store.add_namespace_scoped(&ns, entries, &global_envs)?;
                }
            }
        }

        debug!(
            path = %filepath.display(),
            servers = server_stores.len(),
            "configuration loaded"
        );

        Ok(Self {
            path,
            filename: filename.to_string(),
            global_envs,
            server_stores,
        })
    }

    /// Directory the configuration was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the configuration file.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Full path of the configuration file.
    pub fn filepath(&self) -> PathBuf {
        self.path.join(&self.filename)
    }

    /// The store of namespaces shared across all servers.
    pub fn global_envs(&self) -> &EnvStore {
        &self.global_envs
    }

    /// Names of the servers with at least one namespace defined, sorted.
    pub fn servers(&self) -> Vec<&str> {
        self.server_stores.keys().map(String::as_str).collect()
    }

    /// The namespaces (services) defined for `server`.
    pub fn services(&self, server: &str) -> Result<Vec<&str>> {
        Ok(self.server_store(server)?.namespaces())
    }

    /// The env store for `server`.
    pub fn server_store(&self, server: &str) -> Result<&EnvStore> {
        self.server_stores
            .get(server)
            .ok_or_else(|| StackError::UnknownServer(server.to_string()))
    }

    /// Export as `{"global": {...}, "services": {server: {...}}}`.
    pub fn export_dict(&self) -> Value {
        let mut services = serde_json::Map::new();
        for (server, store) in &self.server_stores {
            services.insert(server.clone(), store.export_dict());
        }
        let mut out = serde_json::Map::new();
        out.insert("global".to_string(), self.global_envs.export_dict());
        out.insert("services".to_string(), Value::Object(services));
        Value::Object(out)
    }

    /// Merge two configurations into a new one under `policy`.
    ///
    /// Global stores are merged directly. Every server of `config1` is merged
    /// with the matching server of `config2` (or an empty store). Servers
    /// present only in `config2` are cloned via the merge-with-empty identity,
    /// so they never go through conflict resolution. Neither operand is
    /// mutated and the result aliases nothing from either.
    pub fn merge(config1: &ConfigFile, config2: &ConfigFile, policy: MergePolicy) -> ConfigFile {
        let mut merged = ConfigFile::empty();
        merged.global_envs = EnvStore::merge(&config1.global_envs, &config2.global_envs, policy);

        let empty = EnvStore::new();
        for (server, store1) in &config1.server_stores {
            let store2 = config2.server_stores.get(server).unwrap_or(&empty);
            merged
                .server_stores
                .insert(server.clone(), EnvStore::merge(store1, store2, policy));
        }
        for (server, store2) in &config2.server_stores {
            if !config1.server_stores.contains_key(server) {
                merged
                    .server_stores
                    .insert(server.clone(), EnvStore::merge(store2, &empty, policy));
            }
        }
        merged
    }
}

/// A `services` section value must map server names to namespace mappings.
fn section_mapping(
    filename: &str,
    value: serde_yaml::Value,
) -> Result<serde_yaml::Mapping> {
    match value {
        serde_yaml::Value::Null => Ok(serde_yaml::Mapping::new()),
        serde_yaml::Value::Mapping(mapping) => Ok(mapping),
        _ => Err(StackError::InvalidDocument {
            filename: filename.to_string(),
            reason: "section value must be a mapping".to_string(),
        }),
    }
}

/// Iterate a section value as (namespace name, normalized entries) pairs.
fn namespace_pairs(
    filename: &str,
    value: serde_yaml::Value,
) -> Result<Vec<(String, Value)>> {
    let mapping = section_mapping(filename, value)?;
    let mut pairs = Vec::with_capacity(mapping.len());
    for (key, entries) in mapping {
        let ns = key_to_string(&key).map_err(|e| StackError::InvalidDocument {
            filename: filename.to_string(),
            reason: e.to_string(),
        })?;
        let entries = normalize(entries).map_err(|e| StackError::InvalidEntries {
            namespace: ns.clone(),
            reason: e.to_string(),
        })?;
        pairs.push((ns, entries));
    }
    Ok(pairs)
}
