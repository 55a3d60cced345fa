//! the alarm list and the JSON file it is mirrored to
//!
//! every mutation writes the whole list back to disk straight away, if that write fails the
//! change is still kept in memory and the error is handed back to the caller to report

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    alarm::{Alarm, AlarmId},
    error::StoreError,
};

pub const DEFAULT_ALARMS_FILE: &str = "alarms.json";

#[derive(Debug)]
pub struct AlarmStore {
    path: PathBuf,
    alarms: Vec<Alarm>,
}

impl AlarmStore {
    /// an empty store backed by `path`, nothing is read or written yet
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            alarms: Vec::new(),
        }
    }

    /// creates a store and loads it, returning the load error (if any) next to the
    /// (then empty) store so the caller can report it
    pub fn open(path: impl Into<PathBuf>) -> (Self, Option<StoreError>) {
        let mut store = Self::new(path);
        let error = store.load().err();
        (store, error)
    }

    /// replaces the in memory list with the contents of the file
    ///
    /// a missing file is an empty list, unreadable or malformed files also leave the list
    /// empty
    ///
    /// # Errors
    /// if the file exists but can't be read or isn't a valid alarm list
    pub fn load(&mut self) -> Result<usize, StoreError> {
        self.alarms.clear();
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no alarms file at {}, starting empty", self.path.display());
                return Ok(0);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        self.alarms = serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        info!(
            "loaded {} alarms from {}",
            self.alarms.len(),
            self.path.display()
        );
        Ok(self.alarms.len())
    }

    /// overwrites the file with the current list
    ///
    /// # Errors
    /// if the list can't be serialized or the file can't be written
    pub fn save(&self) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(&self.alarms)?;
        let write = |path: &Path| -> io::Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)
        };
        write(&self.path).map_err(|source| {
            warn!("couldn't save alarms to {}: {source}", self.path.display());
            StoreError::Write {
                path: self.path.clone(),
                source,
            }
        })?;
        debug!("saved {} alarms to {}", self.alarms.len(), self.path.display());
        Ok(())
    }

    /// appends an alarm (always active) and saves
    ///
    /// # Errors
    /// if saving fails, the alarm stays in the list regardless
    pub fn add(&mut self, mut alarm: Alarm) -> Result<AlarmId, StoreError> {
        alarm.active = true;
        let id = alarm.id;
        info!(
            "adding alarm {id} at {:02}:{:02} on days {:?}",
            alarm.hour, alarm.minute, alarm.days
        );
        self.alarms.push(alarm);
        self.save()?;
        Ok(id)
    }

    /// removes the alarm at `index` (0 based), shifting the ones after it, and saves
    ///
    /// # Errors
    /// [`StoreError::InvalidIndex`] if there is no alarm at `index`, or a save error
    pub fn remove_at(&mut self, index: usize) -> Result<Alarm, StoreError> {
        if index >= self.alarms.len() {
            return Err(StoreError::InvalidIndex {
                index,
                len: self.alarms.len(),
            });
        }
        let alarm = self.alarms.remove(index);
        info!("removed alarm {} at position {index}", alarm.id);
        self.save()?;
        Ok(alarm)
    }

    /// turns every alarm off and saves
    ///
    /// # Errors
    /// if saving fails
    pub fn deactivate_all(&mut self) -> Result<(), StoreError> {
        self.alarms.iter_mut().for_each(|alarm| alarm.active = false);
        info!("deactivated all {} alarms", self.alarms.len());
        self.save()
    }

    /// turns one alarm off and saves, returns false if there is no such alarm
    ///
    /// # Errors
    /// if saving fails
    pub fn deactivate(&mut self, id: AlarmId) -> Result<bool, StoreError> {
        let Some(alarm) = self.alarms.iter_mut().find(|alarm| alarm.id == id) else {
            return Ok(false);
        };
        alarm.active = false;
        info!("deactivated alarm {id}");
        self.save()?;
        Ok(true)
    }

    #[must_use]
    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|alarm| alarm.id == id)
    }

    #[must_use]
    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
