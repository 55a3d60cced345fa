use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{alarm::DEFAULT_MESSAGE, error::ConfigError, store::DEFAULT_ALARMS_FILE};

/// which sound backend plays alarms
#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// tones and sound files through the default audio device
    #[default]
    Rodio,
    /// the terminal bell for beeps, no sound files
    Terminal,
    /// no sound at all
    None,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub alarms_file: PathBuf,
    pub sounds_dir: PathBuf,
    pub sound_backend: BackendKind,
    pub poll_interval_ms: u64,
    pub default_message: String,
    pub beep_frequency: f32,
    pub beep_duration_ms: u64,
    pub volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alarms_file: PathBuf::from(DEFAULT_ALARMS_FILE),
            sounds_dir: Self::sounds_path().unwrap_or_else(|_| PathBuf::from("sounds")),
            sound_backend: BackendKind::default(),
            poll_interval_ms: 1000,
            default_message: DEFAULT_MESSAGE.to_string(),
            beep_frequency: 1000.0,
            beep_duration_ms: 1000,
            volume: 1.0,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// if the file can't be read or isn't valid toml for a config
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&config)?)
    }

    /// the config at `path`, or the defaults if there is no file there
    ///
    /// # Errors
    /// if a file exists but can't be read or parsed
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            config => config,
        }
    }

    /// # Errors
    /// if the config can't be serialized or written
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let config = toml::to_string_pretty(self)?;
        let write = |path: &Path| -> io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, config)
        };
        write(path).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn project_dirs() -> Result<directories::ProjectDirs, ConfigError> {
        directories::ProjectDirs::from("", "", "alarm_clock").ok_or(ConfigError::NoProjectDirs)
    }

    /// # Errors
    /// if there is no home directory
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = Self::project_dirs()?.config_dir().to_path_buf();
        path.push("config.toml");
        Ok(path)
    }

    /// # Errors
    /// if there is no home directory
    pub fn sounds_path() -> Result<PathBuf, ConfigError> {
        let mut path = Self::project_dirs()?.data_dir().to_path_buf();
        path.push("sounds");
        Ok(path)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn beep_duration(&self) -> Duration {
        Duration::from_millis(self.beep_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            alarms_file = "/tmp/mine.json"
            sound_backend = "terminal"
            "#,
        )
        .unwrap();
        assert_eq!(config.alarms_file, PathBuf::from("/tmp/mine.json"));
        assert_eq!(config.sound_backend, BackendKind::Terminal);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.default_message, DEFAULT_MESSAGE);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();
        assert!(matches!(
            Config::load_or_default(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub/config.toml");
        let config = Config {
            sound_backend: BackendKind::None,
            beep_frequency: 440.0,
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
