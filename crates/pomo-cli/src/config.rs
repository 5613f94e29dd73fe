//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Where intervals are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite database file.
    #[default]
    Sqlite,
    /// Process memory; lost on exit.
    Memory,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Storage backend.
    #[serde(default)]
    pub backend: Backend,

    /// Work interval length (e.g., "25m").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro: Option<String>,

    /// Short break length (e.g., "5m").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break: Option<String>,

    /// Long break length (e.g., "15m").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break: Option<String>,
}

/// Values given on the command line, layered over every other source.
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pomodoro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_break: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_break: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("pomo.db"),
            backend: Backend::default(),
            pomodoro: None,
            short_break: None,
            long_break: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file, then applies overrides.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(
        config_path: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (POMO_*)
        figment = figment.merge(Env::prefixed("POMO_"));

        figment = figment.merge(Serialized::defaults(overrides));

        figment.extract()
    }

    /// Parses the configured durations. Unset values come back as zero, which
    /// the engine replaces with its defaults.
    pub fn durations(&self) -> Result<(Duration, Duration, Duration), humantime::DurationError> {
        Ok((
            parse_duration(self.pomodoro.as_deref())?,
            parse_duration(self.short_break.as_deref())?,
            parse_duration(self.long_break.as_deref())?,
        ))
    }
}

fn parse_duration(value: Option<&str>) -> Result<Duration, humantime::DurationError> {
    value.map_or(Ok(Duration::ZERO), humantime::parse_duration)
}

/// Returns the platform-specific config directory for pomo.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pomo"))
}

/// Returns the platform-specific data directory for pomo.
///
/// On Linux: `~/.local/share/pomo`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("pomo"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_pomo() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "pomo");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("pomo.db"));
        assert_eq!(config.backend, Backend::Sqlite);
    }

    #[test]
    fn test_config_file_and_overrides() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pomo.toml");
        std::fs::write(
            &path,
            "database_path = \"/tmp/file.db\"\nbackend = \"memory\"\npomodoro = \"50m\"\nshort_break = \"10m\"\n",
        )
        .unwrap();

        let overrides = Overrides {
            short_break: Some("7m".to_string()),
            ..Overrides::default()
        };
        let config = Config::load_from(Some(&path), &overrides).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/file.db"));
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.pomodoro.as_deref(), Some("50m"));
        assert_eq!(config.short_break.as_deref(), Some("7m"));
        assert_eq!(config.long_break, None);
    }

    #[test]
    fn test_durations_parse_human_values() {
        let config = Config {
            pomodoro: Some("1h 5m".to_string()),
            short_break: None,
            long_break: Some("90s".to_string()),
            ..Config::default()
        };

        let (pomodoro, short_break, long_break) = config.durations().unwrap();
        assert_eq!(pomodoro, Duration::from_secs(65 * 60));
        assert_eq!(short_break, Duration::ZERO);
        assert_eq!(long_break, Duration::from_secs(90));
    }

    #[test]
    fn test_durations_reject_garbage() {
        let config = Config {
            pomodoro: Some("soon".to_string()),
            ..Config::default()
        };
        assert!(config.durations().is_err());
    }
}
