use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// sound name that plays a tone instead of a sample
pub const BEEP: &str = "beep";
pub const DEFAULT_MESSAGE: &str = "Time to get up!";
/// monday is 0, sunday is 6
pub const EVERY_DAY: [u32; 7] = [0, 1, 2, 3, 4, 5, 6];
const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// process local identifier of an alarm, it is never written to the alarms file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlarmId(u64);

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static UID: AtomicU64 = AtomicU64::new(1);

pub fn get_uid() -> AlarmId {
    AlarmId(UID.fetch_add(1, Ordering::Relaxed))
}

#[inline]
#[must_use]
pub const fn always_true() -> bool {
    true
}

fn default_sound() -> String {
    BEEP.to_string()
}

/// represents an alarm
/// contains the time of day it goes off at, the days it is allowed to go off on,
/// how it sounds and whether (and how often) it repeats
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Alarm {
    pub hour: u32,
    pub minute: u32,
    pub days: Vec<u32>,
    #[serde(default = "default_sound")]
    pub sound: String,
    /// minutes between repeats, 0 means the alarm turns itself off after going off once
    #[serde(default)]
    pub repeat_interval: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default = "always_true")]
    pub active: bool,
    #[serde(skip, default = "get_uid")]
    pub id: AlarmId,
}

// ids are handed out per process so two loads of the same file compare equal
impl PartialEq for Alarm {
    fn eq(&self, other: &Self) -> bool {
        self.hour == other.hour
            && self.minute == other.minute
            && self.days == other.days
            && self.sound == other.sound
            && self.repeat_interval == other.repeat_interval
            && self.message == other.message
            && self.active == other.active
    }
}

impl Eq for Alarm {}

impl Alarm {
    /// true if `now` falls in the alarm's minute on one of its days and the alarm is active
    pub fn is_due<T: Datelike + Timelike>(&self, now: &T) -> bool {
        self.active
            && now.hour() == self.hour
            && now.minute() == self.minute
            && self.days.contains(&weekday_index(now))
    }

    #[must_use]
    pub const fn repeats(&self) -> bool {
        self.repeat_interval > 0
    }
}

/// 0 for monday through 6 for sunday
pub fn weekday_index<T: Datelike>(date: &T) -> u32 {
    date.weekday().num_days_from_monday()
}

#[must_use]
pub fn day_name(day: u32) -> &'static str {
    usize::try_from(day)
        .ok()
        .and_then(|day| DAY_NAMES.get(day))
        .copied()
        .unwrap_or("?")
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self
            .days
            .iter()
            .map(|day| day_name(*day))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{:02}:{:02} (days: {days}), sound: {}, repeat: ",
            self.hour, self.minute, self.sound
        )?;
        if self.repeats() {
            write!(f, "{} min", self.repeat_interval)?;
        } else {
            write!(f, "no repeat")?;
        }
        write!(
            f,
            ", message: \"{}\" [{}]",
            self.message,
            if self.active { "active" } else { "inactive" }
        )
    }
}

/// collects the fields of a new alarm and checks them before an [`Alarm`] is made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmBuilder {
    hour: u32,
    minute: u32,
    days: Vec<u32>,
    sound: String,
    repeat_interval: u32,
    message: String,
}

impl Default for AlarmBuilder {
    fn default() -> Self {
        let time = chrono::Local::now().naive_local().time();
        Self {
            hour: time.hour(),
            minute: time.minute(),
            days: EVERY_DAY.to_vec(),
            sound: default_sound(),
            repeat_interval: 0,
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl AlarmBuilder {
    #[must_use]
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            hour,
            minute,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn days(mut self, days: impl IntoIterator<Item = u32>) -> Self {
        self.days = days.into_iter().collect();
        self
    }

    #[must_use]
    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = sound.into();
        self
    }

    #[must_use]
    pub const fn repeat_interval(mut self, minutes: u32) -> Self {
        self.repeat_interval = minutes;
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// # Errors
    /// if the time, a day or the sound name is out of range
    pub fn build(self) -> Result<Alarm, InputError> {
        if self.hour > 23 {
            return Err(InputError::Hour(self.hour));
        }
        if self.minute > 59 {
            return Err(InputError::Minute(self.minute));
        }
        let mut days = self.days;
        if let Some(day) = days.iter().find(|day| **day > 6) {
            return Err(InputError::Day(*day));
        }
        days.sort_unstable();
        days.dedup();
        if days.is_empty() {
            return Err(InputError::NoDays);
        }
        check_sound_name(&self.sound)?;
        Ok(Alarm {
            hour: self.hour,
            minute: self.minute,
            days,
            sound: self.sound,
            repeat_interval: self.repeat_interval,
            message: self.message,
            active: true,
            id: get_uid(),
        })
    }
}

/// sound names become file names so they can't contain paths
///
/// # Errors
/// if the name is empty or has anything besides letters, digits, `-` and `_`
pub fn check_sound_name(sound: &str) -> Result<(), InputError> {
    if !sound.is_empty()
        && sound
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(InputError::Sound(sound.to_string()))
    }
}

/// parses day numbers separated by spaces or commas, blank input means every day
///
/// # Errors
/// if something isn't a number or is not a day between 0 and 6
pub fn parse_days(input: &str) -> Result<Vec<u32>, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(EVERY_DAY.to_vec());
    }
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let day = part
                .parse::<u32>()
                .map_err(|_| InputError::Number(part.to_string()))?;
            if day > 6 {
                Err(InputError::Day(day))
            } else {
                Ok(day)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    // 2024-01-01 was a monday
    fn monday(hour: u32, minute: u32) -> chrono::NaiveDateTime {
        at(2024, 1, 1, hour, minute, 0)
    }

    fn weekday_alarm() -> Alarm {
        AlarmBuilder::new(7, 30)
            .days([0, 1, 2, 3, 4])
            .message("Wake up")
            .build()
            .unwrap()
    }

    #[test]
    fn due_on_matching_minute() {
        let alarm = weekday_alarm();
        assert!(alarm.is_due(&monday(7, 30)));
        assert!(alarm.is_due(&at(2024, 1, 1, 7, 30, 59)));
    }

    #[test]
    fn not_due_on_other_hour_minute_or_day() {
        let alarm = weekday_alarm();
        assert!(!alarm.is_due(&monday(8, 30)));
        assert!(!alarm.is_due(&monday(7, 31)));
        assert!(!alarm.is_due(&at(2024, 1, 1, 7, 29, 59)));
        // saturday
        assert!(!alarm.is_due(&at(2024, 1, 6, 7, 30, 0)));
    }

    #[test]
    fn inactive_alarm_is_never_due() {
        let mut alarm = weekday_alarm();
        alarm.active = false;
        assert!(!alarm.is_due(&monday(7, 30)));
    }

    #[test]
    fn due_on_every_listed_day() {
        let alarm = AlarmBuilder::new(0, 0).build().unwrap();
        for day in 1..=7 {
            assert!(alarm.is_due(&at(2024, 1, day, 0, 0, 0)), "day {day}");
        }
    }

    #[test]
    fn weekday_index_starts_at_monday() {
        assert_eq!(weekday_index(&monday(0, 0)), 0);
        assert_eq!(weekday_index(&at(2024, 1, 7, 0, 0, 0)), 6);
    }

    #[test]
    fn builder_rejects_out_of_range_values() {
        assert_eq!(AlarmBuilder::new(24, 0).build(), Err(InputError::Hour(24)));
        assert_eq!(AlarmBuilder::new(0, 60).build(), Err(InputError::Minute(60)));
        assert_eq!(
            AlarmBuilder::new(0, 0).days([1, 7]).build(),
            Err(InputError::Day(7))
        );
        assert_eq!(
            AlarmBuilder::new(0, 0).days(Vec::new()).build(),
            Err(InputError::NoDays)
        );
        assert_eq!(
            AlarmBuilder::new(0, 0).sound("../etc/passwd").build(),
            Err(InputError::Sound("../etc/passwd".to_string()))
        );
    }

    #[test]
    fn builder_normalizes_days_and_activates() {
        let alarm = AlarmBuilder::new(6, 5)
            .days([4, 0, 4])
            .sound("custom1")
            .repeat_interval(5)
            .build()
            .unwrap();
        assert_eq!(alarm.days, vec![0, 4]);
        assert!(alarm.active);
        assert!(alarm.repeats());
        assert_eq!(alarm.message, DEFAULT_MESSAGE);
    }

    #[test]
    fn each_alarm_gets_its_own_id() {
        assert_ne!(weekday_alarm().id, weekday_alarm().id);
    }

    #[test]
    fn parse_days_accepts_spaces_and_commas() {
        assert_eq!(parse_days("0 2,4"), Ok(vec![0, 2, 4]));
        assert_eq!(parse_days("   "), Ok(EVERY_DAY.to_vec()));
        assert_eq!(parse_days("1 9"), Err(InputError::Day(9)));
        assert_eq!(parse_days("mon"), Err(InputError::Number("mon".to_string())));
    }

    #[test]
    fn serializes_only_the_file_fields() {
        let json = serde_json::to_value(weekday_alarm()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hour": 7,
                "minute": 30,
                "days": [0, 1, 2, 3, 4],
                "sound": "beep",
                "repeat_interval": 0,
                "message": "Wake up",
                "active": true,
            })
        );
    }

    #[test]
    fn displays_like_the_list_view() {
        let mut alarm = AlarmBuilder::new(7, 5)
            .days([0, 6])
            .repeat_interval(10)
            .message("hi")
            .build()
            .unwrap();
        assert_eq!(
            alarm.to_string(),
            "07:05 (days: Mon, Sun), sound: beep, repeat: 10 min, message: \"hi\" [active]"
        );
        alarm.repeat_interval = 0;
        alarm.active = false;
        assert!(alarm.to_string().ends_with("repeat: no repeat, message: \"hi\" [inactive]"));
    }
}
