//! `.env` file generation from exported stores.
//!
//! Turns the JSON-safe export of an [`crate::config::EnvStore`] into
//! `KEY=value` files, one per namespace, under a per-server directory. This
//! is the write side consumed by the compose override's `env_file` wiring.

use crate::config::EnvStore;
use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Render one namespace's entries as sorted `KEY=value` lines with a
/// trailing newline.
///
/// Scalars are rendered bare (no quoting); lists and mappings are rendered
/// as compact JSON so they survive a round trip through the consuming
/// process.
pub fn render_env(entries: &serde_json::Map<String, Value>) -> String {
    let mut keys: Vec<&String> = entries.keys().collect();
    keys.sort_unstable();

    let mut out = String::new();
    for key in keys {
        out.push_str(key);
        out.push('=');
        out.push_str(&render_value(&entries[key.as_str()]));
        out.push('\n');
    }
    out
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        collection => serde_json::to_string(collection).unwrap_or_default(),
    }
}

/// Write all of a server's namespaces as `<root>/<server>/<namespace>.env`.
///
/// Returns the namespace to file-path mapping, used to wire each service's
/// `env_file` into the compose override.
pub fn write_server_envs(
    root: impl AsRef<Path>,
    server: &str,
    store: &EnvStore,
) -> Result<BTreeMap<String, PathBuf>> {
    let server_dir = root.as_ref().join(server);
    std::fs::create_dir_all(&server_dir)?;

    let mut paths = BTreeMap::new();
    let Value::Object(namespaces) = store.export_dict() else {
        return Ok(paths);
    };
    for (namespace, entries) in &namespaces {
        let Value::Object(entries) = entries else {
            continue;
        };
        let filepath = server_dir.join(format!("{namespace}.env"));
        std::fs::write(&filepath, render_env(entries))?;
        debug!(path = %filepath.display(), entries = entries.len(), "env file written");
        paths.insert(namespace.clone(), filepath);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn entries(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be a mapping"),
        }
    }

    #[test]
    fn test_render_sorted_lines_with_trailing_newline() {
        let rendered = render_env(&entries(json!({"B": "two", "A": 1})));
        assert_eq!(rendered, "A=1\nB=two\n");
    }

    #[test]
    fn test_render_scalars_bare_and_collections_as_json() {
        let rendered = render_env(&entries(json!({
            "FLAG": true,
            "EMPTY": null,
            "HOSTS": ["a", "b"],
        })));
        assert_eq!(rendered, "EMPTY=\nFLAG=true\nHOSTS=[\"a\",\"b\"]\n");
    }

    #[test]
    fn test_write_server_envs_layout() {
        let dir = TempDir::new().unwrap();
        let mut store = EnvStore::new();
        store.add_namespace("web", json!({"PORT": 80})).unwrap();
        store.add_namespace("db", json!({"USER": "admin"})).unwrap();

        let paths = write_server_envs(dir.path(), "server1", &store).unwrap();
        assert_eq!(
            paths.keys().collect::<Vec<_>>(),
            vec!["db", "web"]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("server1/web.env")).unwrap(),
            "PORT=80\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("server1/db.env")).unwrap(),
            "USER=admin\n"
        );
    }
}
