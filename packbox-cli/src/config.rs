use std::path::Path;

use anyhow::{anyhow, Context};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DEFLATE level for box headers and compressed maps (0-9)
    pub compression_level: u32,
    pub log_level: String,
    /// File name `unpack` gives the extracted manifest
    pub manifest_file_name: String,
}

/// Values read from a TOML config file; missing keys keep the current value
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileOverrides {
    compression_level: Option<u32>,
    log_level: Option<String>,
    manifest_file_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compression_level: 9,
            log_level: "info".to_string(),
            manifest_file_name: "contentDefinition.json".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            compression_level: std::env::var("PACKBOX_COMPRESSION_LEVEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.compression_level),
            log_level: std::env::var("PACKBOX_LOG_LEVEL").unwrap_or(defaults.log_level),
            manifest_file_name: std::env::var("PACKBOX_MANIFEST_FILE_NAME")
                .unwrap_or(defaults.manifest_file_name),
        }
    }

    /// Environment configuration, overlaid by `path` when given, then validated
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = Self::from_env();
        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            config
                .apply_toml(&content)
                .with_context(|| format!("Invalid TOML in config file: {:?}", path))?;
        }
        config.validate().map_err(|e| anyhow!(e))?;
        Ok(config)
    }

    /// Overlay the keys present in a TOML document
    pub fn apply_toml(&mut self, content: &str) -> Result<(), toml::de::Error> {
        let overrides: FileOverrides = toml::from_str(content)?;
        if let Some(level) = overrides.compression_level {
            self.compression_level = level;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(name) = overrides.manifest_file_name {
            self.manifest_file_name = name;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.compression_level > 9 {
            return Err("compression_level must be between 0 and 9".to_string());
        }

        if self.log_level.trim().is_empty() {
            return Err("log_level cannot be empty".to_string());
        }

        // Joined onto the unpack directory, so it must stay a bare file name
        let name = Path::new(&self.manifest_file_name);
        if self.manifest_file_name.is_empty()
            || name.file_name().map(|n| n != name.as_os_str()).unwrap_or(true)
        {
            return Err(format!(
                "manifest_file_name must be a plain file name, got {:?}",
                self.manifest_file_name
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.compression_level, 9);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.manifest_file_name, "contentDefinition.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_overlay_keeps_missing_keys() {
        let mut config = Config::default();
        config
            .apply_toml("compression_level = 3\nlog_level = \"debug\"\n")
            .unwrap();
        assert_eq!(config.compression_level, 3);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.manifest_file_name, "contentDefinition.json");
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        let mut config = Config::default();
        assert!(config.apply_toml("listen_addr = \"0.0.0.0\"").is_err());
        assert!(config.apply_toml("compression_level = \"high\"").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            compression_level: 10,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            log_level: " ".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        for name in ["", "nested/manifest.json", "..", "."] {
            let config = Config {
                manifest_file_name: name.into(),
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{name:?} accepted");
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packbox.toml");
        std::fs::write(&path, "manifest_file_name = \"content.json\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.manifest_file_name, "content.json");

        std::fs::write(&path, "compression_level = 42\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
