//! Error types for the alarm clock.
//!
//! Every error here is recoverable: callers report it and carry on.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures of the alarm store and its file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("couldn't read alarms file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed alarms file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("couldn't write alarms file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't serialize alarms: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid alarm index {index} (there are {len} alarms)")]
    InvalidIndex { index: usize, len: usize },
}

/// Malformed user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("hour must be between 0 and 23, got {0}")]
    Hour(u32),

    #[error("minute must be between 0 and 59, got {0}")]
    Minute(u32),

    #[error("day must be between 0 (Monday) and 6 (Sunday), got {0}")]
    Day(u32),

    #[error("an alarm needs at least one day")]
    NoDays,

    #[error("`{0}` is not a number")]
    Number(String),

    #[error("`{0}` is not a valid sound name")]
    Sound(String),
}

/// A sound that couldn't be played.
#[derive(Error, Debug)]
pub enum SoundError {
    #[error("the {backend} backend can't play `{sound}`")]
    BackendUnavailable { backend: &'static str, sound: String },

    #[error("sound file for `{sound}` not found in {}", .dir.display())]
    SampleNotFound { sound: String, dir: PathBuf },

    #[error(transparent)]
    Name(#[from] InputError),

    #[error("couldn't open sound file: {0}")]
    Io(#[from] io::Error),

    #[error("audio playback failed: {0}")]
    Playback(String),
}

/// Failures loading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't find a home directory for the config")]
    NoProjectDirs,

    #[error("couldn't read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("couldn't write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
