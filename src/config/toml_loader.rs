//! TOML configuration file loading shared by settings and the catalog.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Read and deserialize a TOML file.
///
/// Returns `Ok(None)` when the file does not exist so callers can fall back
/// to built-in defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, and
/// [`ConfigError::InvalidSyntax`] if it is not valid TOML for `T`.
pub fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    load_required(path).map(Some)
}

/// Read and deserialize a TOML file that must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, and
/// [`ConfigError::InvalidSyntax`] if it is not valid TOML for `T`.
pub fn load_required<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_str(&content, &path.display().to_string())
}

/// Deserialize TOML `content`, attributing errors to `file`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidSyntax`] if the content does not parse.
pub fn parse_str<T: DeserializeOwned>(content: &str, file: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::InvalidSyntax {
        file: file.to_string(),
        message: e.message().to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq, Eq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<Sample> = load_optional(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn present_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.toml");
        std::fs::write(&path, "name = \"shell\"\n").unwrap();
        let loaded: Option<Sample> = load_optional(&path).unwrap();
        assert_eq!(
            loaded,
            Some(Sample {
                name: "shell".to_string()
            })
        );
    }

    #[test]
    fn invalid_toml_reports_file() {
        let err = parse_str::<Sample>("name = ", "broken.toml").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { ref file, .. } if file == "broken.toml"));
    }

    #[test]
    fn required_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_required::<Sample>(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
