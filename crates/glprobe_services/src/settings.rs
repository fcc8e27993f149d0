//! Settings management

use glprobe_core::{BackendKind, LibraryOverrides, ProbeContext};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Probe settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendKind,
    pub libraries: LibraryOverrides,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub key: String,
    /// Template with `{1}` version, `{2}` renderer, `{3}` vendor and
    /// `{4}` shading language version.
    pub format: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            key: "OpenGL".to_string(),
            format: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), backend = %settings.backend, "loaded settings");
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn probe_context(&self) -> ProbeContext {
        ProbeContext::new(self.libraries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.backend, BackendKind::Auto);
        assert_eq!(settings.output.key, "OpenGL");
    }

    #[test]
    fn test_explicit_backend_and_override() {
        let settings = Settings::from_json(
            r#"{
                "backend": "osmesa",
                "libraries": { "osmesa": "/usr/lib/libOSMesa.so.8" },
                "output": { "format": "{3} {2} ({1})" }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.backend, BackendKind::OsMesa);
        assert_eq!(settings.libraries.osmesa.as_deref(), Some("/usr/lib/libOSMesa.so.8"));
        assert_eq!(settings.output.key, "OpenGL");

        let names = settings
            .probe_context()
            .library_candidates(BackendKind::OsMesa, "libOSMesa", 8);
        assert_eq!(names[0], "/usr/lib/libOSMesa.so.8");
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Settings::from_json(r#"{ "backend": "vulkan" }"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "backend": "glx" }}"#).unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.backend, BackendKind::Glx);
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
