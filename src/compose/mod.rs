//! Minimal docker-compose document handling.
//!
//! Two deliberately narrow types: [`ComposeFile`] reads just enough of an
//! existing compose document to list its services, and
//! [`EditableDockerCompose`] builds an override document touching only the
//! fields this tool manages (`env_file`, `volumes`). Nothing here validates
//! the full compose schema; the tool trusts its own narrow writes.

use crate::error::{Result, StackError};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Conventional compose file names.
pub const DOCKER_COMPOSE_FILENAME: &str = "docker-compose.yml";
pub const DOCKER_COMPOSE_OVERRIDE_FILENAME: &str = "docker-compose.override.yml";

/// Light read-only view of an existing compose document.
#[derive(Debug, Clone)]
pub struct ComposeFile {
    path: PathBuf,
    filename: String,
    content: Value,
}

impl ComposeFile {
    /// Load `filename` from `path`.
    ///
    /// Fails with [`StackError::NoComposeFile`] if the file does not exist.
    pub fn load(path: impl AsRef<Path>, filename: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let filepath = path.join(filename);
        if !filepath.is_file() {
            return Err(StackError::NoComposeFile(path));
        }
        let text = std::fs::read_to_string(&filepath)?;
        let content: Value = serde_yaml::from_str(&text)?;
        Ok(Self {
            path,
            filename: filename.to_string(),
            content,
        })
    }

    /// Full path of the compose file.
    pub fn filepath(&self) -> PathBuf {
        self.path.join(&self.filename)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Names of the services declared in the document.
    pub fn services(&self) -> Vec<&str> {
        self.content
            .get("services")
            .and_then(Value::as_object)
            .map(|services| services.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The document's `version` string, if any.
    pub fn version(&self) -> Option<&str> {
        self.content.get("version").and_then(Value::as_str)
    }
}

/// The subset of a compose service this tool edits.
#[derive(Debug, Clone, Default, Serialize)]
struct ServiceEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    env_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volumes: Option<Vec<String>>,
}

/// In-memory builder for a minimal compose override document.
///
/// Services are created lazily on first edit; the document is serialized
/// once at the end with [`EditableDockerCompose::write_to`].
#[derive(Debug, Clone, Serialize)]
pub struct EditableDockerCompose {
    version: String,
    services: BTreeMap<String, ServiceEntry>,
}

impl EditableDockerCompose {
    /// Create an empty document with the given compose version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            services: BTreeMap::new(),
        }
    }

    /// Create-or-get the entry for `service`. All lazy service creation goes
    /// through here.
    fn service_entry(&mut self, service: &str) -> &mut ServiceEntry {
        self.services.entry(service.to_string()).or_default()
    }

    /// Set (or replace) the service's `env_file`, creating the service entry
    /// if needed.
    pub fn set_service_env_file(&mut self, service: &str, filepath: impl Into<String>) {
        self.service_entry(service).env_file = Some(filepath.into());
    }

    /// Append a volume mapping to the service, creating the service entry and
    /// the volume list if needed.
    pub fn add_service_volume(&mut self, service: &str, mapping: impl Into<String>) {
        self.service_entry(service)
            .volumes
            .get_or_insert_with(Vec::new)
            .push(mapping.into());
    }

    /// The service's current volume mappings.
    ///
    /// Fails with [`StackError::UnknownService`] if the service was never
    /// created, and with [`StackError::MissingServiceVolumes`] if the service
    /// exists but has no volume list (never added, or cleared).
    pub fn get_service_volumes(&self, service: &str) -> Result<&[String]> {
        let entry = self
            .services
            .get(service)
            .ok_or_else(|| StackError::UnknownService(service.to_string()))?;
        entry
            .volumes
            .as_deref()
            .ok_or_else(|| StackError::MissingServiceVolumes(service.to_string()))
    }

    /// Remove the service's volume list.
    ///
    /// A no-op when the service has no volumes, and when the service does not
    /// exist at all.
    pub fn clear_service_volumes(&mut self, service: &str) {
        if let Some(entry) = self.services.get_mut(service) {
            entry.volumes = None;
        }
    }

    /// Serialize the document to `path`/`filename` as YAML.
    pub fn write_to(&self, path: impl AsRef<Path>, filename: &str) -> Result<()> {
        let filepath = path.as_ref().join(filename);
        let text = serde_yaml::to_string(self)?;
        std::fs::write(&filepath, text)?;
        debug!(path = %filepath.display(), services = self.services.len(), "compose document written");
        Ok(())
    }
}

impl Default for EditableDockerCompose {
    fn default() -> Self {
        Self::new("3.9")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod editable_tests {
        use super::*;

        #[test]
        fn test_env_file_upsert_creates_service() {
            let mut compose = EditableDockerCompose::default();
            compose.set_service_env_file("web", "envs/s1/web.env");
            compose.set_service_env_file("web", "envs/s2/web.env");

            let yaml = serde_yaml::to_string(&compose).unwrap();
            assert!(yaml.contains("env_file: envs/s2/web.env"));
            assert!(!yaml.contains("envs/s1"));
        }

        #[test]
        fn test_add_then_get_volumes() {
            let mut compose = EditableDockerCompose::default();
            compose.add_service_volume("web", "a:b");
            compose.add_service_volume("web", "c:d");
            assert_eq!(compose.get_service_volumes("web").unwrap(), ["a:b", "c:d"]);
        }

        #[test]
        fn test_get_volumes_unknown_service() {
            let compose = EditableDockerCompose::default();
            assert!(matches!(
                compose.get_service_volumes("web").unwrap_err(),
                StackError::UnknownService(name) if name == "web"
            ));
        }

        #[test]
        fn test_cleared_volumes_fail_on_get() {
            let mut compose = EditableDockerCompose::default();
            compose.add_service_volume("web", "a:b");
            compose.clear_service_volumes("web");

            assert!(matches!(
                compose.get_service_volumes("web").unwrap_err(),
                StackError::MissingServiceVolumes(name) if name == "web"
            ));
        }

        #[test]
        fn test_clear_is_noop_without_volumes_or_service() {
            let mut compose = EditableDockerCompose::default();
            compose.set_service_env_file("web", "web.env");
            // Service without volumes, and service that does not exist.
            compose.clear_service_volumes("web");
            compose.clear_service_volumes("ghost");
            // "ghost" must not have been created by the clear.
            assert!(matches!(
                compose.get_service_volumes("ghost").unwrap_err(),
                StackError::UnknownService(_)
            ));
        }

        #[test]
        fn test_written_document_omits_empty_fields() {
            let dir = TempDir::new().unwrap();
            let mut compose = EditableDockerCompose::new("3.7");
            compose.set_service_env_file("web", "web.env");
            compose.add_service_volume("db", "data:/var/lib/data");
            compose.write_to(dir.path(), "docker-compose.override.yml").unwrap();

            let text =
                std::fs::read_to_string(dir.path().join("docker-compose.override.yml")).unwrap();
            let parsed: Value = serde_yaml::from_str(&text).unwrap();
            assert_eq!(parsed["version"], "3.7");
            assert_eq!(parsed["services"]["web"]["env_file"], "web.env");
            assert!(parsed["services"]["web"].get("volumes").is_none());
            assert_eq!(parsed["services"]["db"]["volumes"][0], "data:/var/lib/data");
            assert!(parsed["services"]["db"].get("env_file").is_none());
        }
    }

    mod compose_file_tests {
        use super::*;

        #[test]
        fn test_load_missing_file_fails() {
            let dir = TempDir::new().unwrap();
            let err = ComposeFile::load(dir.path(), DOCKER_COMPOSE_FILENAME).unwrap_err();
            assert!(matches!(err, StackError::NoComposeFile(_)));
        }

        #[test]
        fn test_services_and_version() {
            let dir = TempDir::new().unwrap();
            std::fs::write(
                dir.path().join("docker-compose.yml"),
                "version: '3.9'\nservices:\n  web:\n    image: nginx\n  db:\n    image: postgres\n",
            )
            .unwrap();

            let compose = ComposeFile::load(dir.path(), DOCKER_COMPOSE_FILENAME).unwrap();
            assert_eq!(compose.version(), Some("3.9"));
            let mut services = compose.services();
            services.sort_unstable();
            assert_eq!(services, vec!["db", "web"]);
        }

        #[test]
        fn test_services_empty_without_section() {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("docker-compose.yml"), "version: '3.9'\n").unwrap();
            let compose = ComposeFile::load(dir.path(), DOCKER_COMPOSE_FILENAME).unwrap();
            assert!(compose.services().is_empty());
        }
    }
}
