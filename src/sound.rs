//! Sound backends that alarms are played through.
//!
//! The backend is picked from the config once at start up and handed to the monitor, so the
//! monitor never needs to know whether there is an audio device.

use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use rodio::{source::SineWave, Source};

use crate::{
    alarm::{check_sound_name, BEEP},
    config::{BackendKind, Config},
    error::SoundError,
};

const SAMPLE_EXTENSIONS: [&str; 4] = ["wav", "mp3", "ogg", "flac"];

pub trait SoundBackend: Send {
    fn name(&self) -> &'static str;

    /// Plays `sound`, blocking until it is done.
    ///
    /// # Errors
    /// if this backend can't play that kind of sound or the sound can't be found/played
    fn play(&self, sound: &str) -> Result<(), SoundError>;
}

#[must_use]
pub fn from_config(config: &Config) -> Box<dyn SoundBackend> {
    match config.sound_backend {
        BackendKind::Rodio => Box::new(RodioBackend {
            sounds_dir: config.sounds_dir.clone(),
            beep_frequency: config.beep_frequency,
            beep_duration: config.beep_duration(),
            volume: config.volume,
        }),
        BackendKind::Terminal => Box::new(TerminalBackend),
        BackendKind::None => Box::new(Silent),
    }
}

/// looks for `<dir>/<sound>.<ext>` with any of the supported extensions
///
/// # Errors
/// [`SoundError::Name`] if `sound` isn't a plain name (alarms files can be edited by hand),
/// [`SoundError::SampleNotFound`] if there is no such file
pub fn find_sample(dir: &Path, sound: &str) -> Result<PathBuf, SoundError> {
    check_sound_name(sound)?;
    SAMPLE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{sound}.{ext}")))
        .find(|path| path.is_file())
        .ok_or_else(|| SoundError::SampleNotFound {
            sound: sound.to_string(),
            dir: dir.to_path_buf(),
        })
}

/// Sine wave beeps and decoded sound files on the default output device.
#[derive(Debug, Clone)]
pub struct RodioBackend {
    pub sounds_dir: PathBuf,
    pub beep_frequency: f32,
    pub beep_duration: Duration,
    pub volume: f32,
}

impl SoundBackend for RodioBackend {
    fn name(&self) -> &'static str {
        "rodio"
    }

    fn play(&self, sound: &str) -> Result<(), SoundError> {
        // find the file first so a typo doesn't need an audio device to be reported
        let sample = if sound == BEEP {
            None
        } else {
            Some(find_sample(&self.sounds_dir, sound)?)
        };

        let mut stream = rodio::OutputStreamBuilder::open_default_stream()
            .map_err(|e| SoundError::Playback(e.to_string()))?;
        // dropping the stream after every alarm would otherwise print to stderr
        stream.log_on_drop(false);
        let sink = rodio::Sink::connect_new(stream.mixer());
        sink.set_volume(self.volume);
        match sample {
            None => {
                sink.append(
                    SineWave::new(self.beep_frequency)
                        .take_duration(self.beep_duration)
                        .amplify(0.2),
                );
            }
            Some(path) => {
                debug!("playing {}", path.display());
                let input = rodio::Decoder::new(BufReader::new(File::open(path)?))
                    .map_err(|e| SoundError::Playback(e.to_string()))?;
                sink.append(input);
            }
        }
        sink.sleep_until_end();
        Ok(())
    }
}

/// Rings the terminal bell for beeps. Sound files are not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBackend;

impl SoundBackend for TerminalBackend {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn play(&self, sound: &str) -> Result<(), SoundError> {
        if sound != BEEP {
            return Err(SoundError::BackendUnavailable {
                backend: self.name(),
                sound: sound.to_string(),
            });
        }
        let mut stdout = io::stdout().lock();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl SoundBackend for Silent {
    fn name(&self) -> &'static str {
        "none"
    }

    fn play(&self, sound: &str) -> Result<(), SoundError> {
        Err(SoundError::BackendUnavailable {
            backend: self.name(),
            sound: sound.to_string(),
        })
    }
}
