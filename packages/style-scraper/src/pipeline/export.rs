//! Writing configs to disk and reading them back.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ExportError, ExportResult};
use crate::schema::StyleSchemaValidator;
use crate::types::style::EventStyleConfig;

/// Persists configs as `<event_id>.json` under one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigExporter {
    output_dir: PathBuf,
}

impl ConfigExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Location a config with this id is written to.
    ///
    /// Ids that could escape the output directory are refused.
    pub fn artifact_path(&self, event_id: &str) -> ExportResult<PathBuf> {
        let unsafe_name = event_id.is_empty()
            || event_id == "."
            || event_id == ".."
            || event_id.contains(['/', '\\', '\0']);
        if unsafe_name {
            return Err(ExportError::InvalidArtifactName(event_id.to_string()));
        }
        Ok(self.output_dir.join(format!("{event_id}.json")))
    }

    /// Write the config as 2-space-indented UTF-8 JSON, replacing any
    /// existing artifact with the same id.
    pub fn export(&self, config: &EventStyleConfig) -> ExportResult<PathBuf> {
        let path = self.artifact_path(&config.event_id)?;
        let body = serde_json::to_string_pretty(config)?;

        fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        fs::write(&path, body.as_bytes()).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        info!(
            event_id = %config.event_id,
            path = %path.display(),
            bytes = body.len(),
            "Style config exported"
        );
        Ok(path)
    }

    /// Read an artifact back through schema validation.
    pub fn load(&self, path: impl AsRef<Path>) -> ExportResult<EventStyleConfig> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        StyleSchemaValidator::new()
            .validate_json(&text)
            .map_err(|source| ExportError::Invalid {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_record;

    fn config(event_id: &str) -> EventStyleConfig {
        let mut record = sample_record("https://example.com");
        record["event_id"] = serde_json::json!(event_id);
        record["event_name"] = serde_json::json!("Fête de la Musique");
        StyleSchemaValidator::new().validate(&record).unwrap()
    }

    #[test]
    fn test_export_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ConfigExporter::new(dir.path().join("nested/style-configs"));

        let path = exporter.export(&config("event-2025")).unwrap();
        assert_eq!(path, dir.path().join("nested/style-configs/event-2025.json"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"event_id\": \"event-2025\""));
        assert!(text.contains("Fête de la Musique"));
    }

    #[test]
    fn test_export_is_idempotent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ConfigExporter::new(dir.path());

        let first = exporter.export(&config("event-2025")).unwrap();
        let first_bytes = fs::read(&first).unwrap();
        let second = exporter.export(&config("event-2025")).unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), first_bytes);

        let mut changed = config("event-2025");
        changed.event_name = "Renamed".into();
        exporter.export(&changed).unwrap();
        let text = fs::read_to_string(&first).unwrap();
        assert!(text.contains("Renamed"));
        assert!(!text.contains("Fête"));
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ConfigExporter::new(dir.path());
        let original = config("event-2025");

        let path = exporter.export(&original).unwrap();
        assert_eq!(exporter.load(&path).unwrap(), original);
    }

    #[test]
    fn test_absent_layout_written_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ConfigExporter::new(dir.path());

        let path = exporter
            .export(&config("event-2025").with_layout(None))
            .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"layout\": null"));
        assert_eq!(exporter.load(&path).unwrap().layout, None);
    }

    #[test]
    fn test_load_invalid_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"event_id": "x"}"#).unwrap();

        let err = ConfigExporter::new(dir.path()).load(&path).unwrap_err();
        assert!(matches!(err, ExportError::Invalid { .. }));
    }

    #[test]
    fn test_unsafe_event_ids_refused() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ConfigExporter::new(dir.path().join("out"));

        for id in ["", ".", "..", "../escape", "a/b", "a\\b"] {
            let err = exporter.export(&config(id)).unwrap_err();
            assert!(matches!(err, ExportError::InvalidArtifactName(_)), "{id:?}");
        }
        assert!(!dir.path().join("out").exists());
    }
}
