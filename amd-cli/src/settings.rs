//! Persisted AMD configuration (JSON file in the user config directory).

use std::fs;
use std::path::{Path, PathBuf};

use amd_core::AmdParameters;
use anyhow::{Context, Result};

/// Environment variable that points at an explicit configuration file.
pub const CONFIG_ENV: &str = "AMD_CONFIG";

pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".config")
        })
        .join("amd")
        .join("amd.json")
}

/// Load parameters; a missing file yields the built-in defaults.
pub fn load_parameters(path: &Path) -> Result<AmdParameters> {
    AmdParameters::load(path)
        .with_context(|| format!("failed to load AMD configuration from {}", path.display()))
}

pub fn save_parameters(path: &Path, params: &AmdParameters) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(params).map_err(std::io::Error::other)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let params = load_parameters(&dir.path().join("absent.json")).expect("load");
        assert_eq!(params, AmdParameters::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("amd.json");
        let mut params = AmdParameters::default();
        params.initial_silence = 1800;
        params.minimum_word_length = 120;

        save_parameters(&path, &params).expect("save");
        let raw = fs::read_to_string(&path).expect("read back");
        assert!(raw.contains("\"min_word_length\": 120"));
        assert_eq!(load_parameters(&path).expect("load"), params);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("amd.json");
        fs::write(&path, "{ not json").expect("write");
        let err = load_parameters(&path).expect_err("should fail");
        assert!(err.to_string().contains("failed to load AMD configuration"));
    }
}
