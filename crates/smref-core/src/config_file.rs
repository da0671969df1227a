use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File extensions scanned when a directory is given as input.
pub const DEFAULT_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];

/// Name of the per-directory config file, looked up in the CWD.
pub const LOCAL_CONFIG_NAME: &str = ".smref.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub output: Option<OutputConfig>,
    pub input: Option<InputConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// One of `text`, `json`, `csv`, `markdown`.
    pub format: Option<String>,
    pub color: Option<bool>,
    /// Leave out documents whose record has no populated field.
    pub skip_empty: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub extensions: Option<Vec<String>>,
    pub recursive: Option<bool>,
}

impl ConfigFile {
    /// Config with every value filled in from the built-in defaults.
    pub fn with_defaults() -> Self {
        ConfigFile {
            output: Some(OutputConfig {
                format: Some("text".to_string()),
                color: Some(true),
                skip_empty: Some(false),
            }),
            input: Some(InputConfig {
                extensions: Some(DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()),
                recursive: Some(true),
            }),
        }
    }

    pub fn format(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.format.as_deref())
    }

    pub fn color(&self) -> bool {
        self.output.as_ref().and_then(|o| o.color).unwrap_or(true)
    }

    pub fn skip_empty(&self) -> bool {
        self.output.as_ref().and_then(|o| o.skip_empty).unwrap_or(false)
    }

    pub fn extensions(&self) -> Vec<String> {
        self.input
            .as_ref()
            .and_then(|i| i.extensions.clone())
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }

    pub fn recursive(&self) -> bool {
        self.input.as_ref().and_then(|i| i.recursive).unwrap_or(true)
    }
}

/// Platform config directory path: `<config_dir>/smref/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("smref").join("config.toml"))
}

/// Load config by cascading CWD `.smref.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(LOCAL_CONFIG_NAME));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        output: Some(OutputConfig {
            format: overlay
                .output
                .as_ref()
                .and_then(|o| o.format.clone())
                .or_else(|| base.output.as_ref().and_then(|o| o.format.clone())),
            color: overlay
                .output
                .as_ref()
                .and_then(|o| o.color)
                .or_else(|| base.output.as_ref().and_then(|o| o.color)),
            skip_empty: overlay
                .output
                .as_ref()
                .and_then(|o| o.skip_empty)
                .or_else(|| base.output.as_ref().and_then(|o| o.skip_empty)),
        }),
        input: Some(InputConfig {
            extensions: overlay
                .input
                .as_ref()
                .and_then(|i| i.extensions.clone())
                .or_else(|| base.input.as_ref().and_then(|i| i.extensions.clone())),
            recursive: overlay
                .input
                .as_ref()
                .and_then(|i| i.recursive)
                .or_else(|| base.input.as_ref().and_then(|i| i.recursive)),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to_path(config, &path)?;
    Ok(path)
}

/// Write the config as pretty TOML, creating parent directories.
pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_round_trip_toml() {
        let config = ConfigFile {
            output: Some(OutputConfig {
                format: Some("json".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.format(), Some("json"));
    }

    #[test]
    fn absent_sections_use_defaults() {
        let parsed: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(parsed.format(), None);
        assert!(parsed.color());
        assert!(!parsed.skip_empty());
        assert!(parsed.recursive());
        assert_eq!(parsed.extensions(), vec!["html", "htm", "xhtml"]);
    }

    #[test]
    fn partial_section_deserializes() {
        let toml_str = "[input]\nrecursive = false\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert!(!parsed.recursive());
        assert!(parsed.input.unwrap().extensions.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            output: Some(OutputConfig {
                format: Some("csv".to_string()),
                color: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            output: Some(OutputConfig {
                format: Some("markdown".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.format(), Some("markdown"));
        assert_eq!(merged.output.unwrap().color, Some(true));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            input: Some(InputConfig {
                extensions: Some(vec!["htm".to_string()]),
                recursive: Some(false),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.extensions(), vec!["htm"]);
        assert!(!merged.recursive());
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = ConfigFile::with_defaults();
        save_to_path(&config, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output\nformat = ").unwrap();
        assert!(load_from_path(&path).is_none());
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());
    }
}
