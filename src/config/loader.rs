//! Multi-source config loading.
//!
//! Priority, highest first:
//! 1. an explicit `--config` path
//! 2. `LNGRAPH_CONFIG`
//! 3. `config.yaml` in the user config directory
//! 4. the preset alone (`LNGRAPH_PRESET`, else the file's `preset:`, else `iclassi`)
//!
//! Only the first file found is read. The file overlays its preset.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::preset::get_preset;
use super::schema::{ConfigFile, GraphConfig, PresetName};
use crate::error::{LnGraphError, Result};

pub const ENV_CONFIG: &str = "LNGRAPH_CONFIG";
pub const ENV_PRESET: &str = "LNGRAPH_PRESET";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Load and validate the effective configuration from the process environment.
pub fn load_config(explicit: Option<&Path>) -> Result<GraphConfig> {
    load_config_with(explicit, |key| std::env::var(key).ok(), user_config_path())
}

/// [`load_config`] with injectable environment lookup and user config path.
pub fn load_config_with<F>(
    explicit: Option<&Path>,
    env: F,
    user_path: Option<PathBuf>,
) -> Result<GraphConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file_path = explicit
        .map(Path::to_path_buf)
        .or_else(|| env(ENV_CONFIG).map(PathBuf::from))
        .or_else(|| user_path.filter(|p| p.is_file()));

    let file = match &file_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Reading config file");
            read_config_file(path)?
        }
        None => ConfigFile::default(),
    };

    let preset = match env(ENV_PRESET) {
        Some(raw) => PresetName::from_str_loose(&raw).ok_or_else(|| {
            LnGraphError::Config(format!("{ENV_PRESET}={raw:?} is not a known preset"))
        })?,
        None => file.preset.unwrap_or(PresetName::Iclassi),
    };

    let mut config = file.apply(get_preset(&preset));
    config.preset = preset;
    config.validate()?;

    tracing::debug!(
        preset = %config.preset,
        columns = config.columns.len(),
        grouping = %config.grouping_column,
        "Configuration loaded"
    );
    Ok(config)
}

/// Parse one YAML config file.
pub fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&text)?)
}

/// `<user config dir>/lngraph/config.yaml`, when a home directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "lngraph").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
