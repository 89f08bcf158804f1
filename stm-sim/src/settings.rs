//! Application settings

use std::path::{Path, PathBuf};

use bus_sim::SequencerConfig;
use serde::{Deserialize, Serialize};

/// Where emitted frames go
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputSettings {
    /// Print frames as hex lines on stdout
    #[default]
    Console,
    /// Write frames to a serial port
    Serial {
        /// Serial port path
        port: String,
        /// Baud rate
        #[serde(default = "default_baud")]
        baud_rate: u32,
    },
}

pub fn default_baud() -> u32 {
    115200
}

/// Simulator settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Emission schedule
    #[serde(default)]
    pub sequencer: SequencerConfig,
    /// Output sink
    #[serde(default)]
    pub output: OutputSettings,
}

impl Settings {
    /// Get the XDG config directory for stm-sim
    /// Uses $XDG_CONFIG_HOME/stm-sim on Linux/macOS, falls back to ~/.config/stm-sim
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("stm-sim"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("stm-sim"))
    }

    /// Get the default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a file, falling back to defaults if it is missing
    /// or unreadable
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("No settings at {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&text) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring invalid settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to a file, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output, OutputSettings::Console);
    }

    #[test]
    fn test_serial_output() {
        let settings = Settings::from_json(
            r#"{ "output": { "type": "serial", "port": "/dev/ttyUSB0" } }"#,
        )
        .unwrap();
        assert_eq!(
            settings.output,
            OutputSettings::Serial {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 115200,
            }
        );
    }

    #[test]
    fn test_sequencer_overrides() {
        let settings = Settings::from_json(
            r#"{ "sequencer": { "idle_to_moving_delay_ms": 10, "error_code": 7 } }"#,
        )
        .unwrap();
        assert_eq!(settings.sequencer.idle_to_moving_delay_ms, 10);
        assert_eq!(settings.sequencer.error_code, 7);
        assert_eq!(settings.sequencer.error_to_idle_delay_ms, 4000);
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings {
            sequencer: SequencerConfig::immediate(),
            output: OutputSettings::Serial {
                port: "COM3".to_string(),
                baud_rate: 9600,
            },
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("stm-sim-test-{}", std::process::id()));
        let path = dir.join("settings.json");

        let settings = Settings {
            sequencer: SequencerConfig::immediate(),
            output: OutputSettings::Console,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_file_is_default() {
        let dir = std::env::temp_dir().join(format!("stm-sim-invalid-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        for json in [
            "{ not json",
            r#"{ "output": 42 }"#,
            r#"{ "output": { "type": "serial" } }"#,
            r#"{ "sequencer": { "error_code": "five" } }"#,
        ] {
            std::fs::write(&path, json).unwrap();
            assert_eq!(Settings::load_from(&path), Settings::default(), "{json}");
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = Path::new("/nonexistent/stm-sim/settings.json");
        assert_eq!(Settings::load_from(path), Settings::default());
    }
}
