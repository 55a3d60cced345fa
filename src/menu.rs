//! The interactive text menu for managing alarms before monitoring starts.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use log::warn;

use crate::{
    alarm::{parse_days, Alarm, AlarmBuilder, BEEP, EVERY_DAY},
    error::InputError,
    store::AlarmStore,
};

/// sound names offered by the menu, in menu order
pub const MENU_SOUNDS: [&str; 3] = [BEEP, "custom1", "custom2"];

/// parses a number between 0 and `max`
///
/// # Errors
/// if it isn't a number or is too big, with `too_big` building the range error
pub fn parse_bounded(
    input: &str,
    max: u32,
    too_big: fn(u32) -> InputError,
) -> Result<u32, InputError> {
    let input = input.trim();
    let value = input
        .parse::<u32>()
        .map_err(|_| InputError::Number(input.to_string()))?;
    if value > max {
        Err(too_big(value))
    } else {
        Ok(value)
    }
}

/// 1, 2 and 3 pick from [`MENU_SOUNDS`], anything else is a beep
#[must_use]
pub fn sound_choice(input: &str) -> &'static str {
    match input.trim() {
        "2" => MENU_SOUNDS[1],
        "3" => MENU_SOUNDS[2],
        _ => MENU_SOUNDS[0],
    }
}

/// blank or invalid input means no repeat
#[must_use]
pub fn parse_repeat(input: &str) -> u32 {
    input.trim().parse().unwrap_or(0)
}

/// Writes the numbered (from 1) list of alarms.
///
/// # Errors
/// if writing fails
pub fn write_alarms<W: Write>(out: &mut W, alarms: &[Alarm]) -> io::Result<()> {
    if alarms.is_empty() {
        return writeln!(out, "{}", "No alarms!".red());
    }
    writeln!(out, "\n{}", "Alarms:".yellow())?;
    for (i, alarm) in alarms.iter().enumerate() {
        writeln!(out, "{}. {alarm}", i + 1)?;
    }
    Ok(())
}

pub struct Menu<R, W> {
    input: R,
    output: W,
    default_message: String,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, default_message: impl Into<String>) -> Self {
        Self {
            input,
            output,
            default_message: default_message.into(),
        }
    }

    /// Shows the menu until the user picks exit or the input ends.
    ///
    /// # Errors
    /// if reading or writing the console fails
    pub fn run(&mut self, store: &mut AlarmStore) -> io::Result<()> {
        loop {
            writeln!(
                self.output,
                "\n=== Alarm clock ===\n{} Add alarm\n{} List alarms\n{} Remove alarm (by number)\n{} Turn off all alarms\n{} Exit and start the alarm clock",
                "1".yellow(),
                "2".yellow(),
                "3".yellow(),
                "4".yellow(),
                "5".yellow()
            )?;
            let Some(choice) = self.read_line(&format!("\n{}", "Choice: ".blue()))? else {
                return Ok(());
            };
            match choice.trim() {
                "1" => {
                    if !self.add(store)? {
                        return Ok(());
                    }
                }
                "2" => write_alarms(&mut self.output, store.alarms())?,
                "3" => {
                    if !self.remove(store)? {
                        return Ok(());
                    }
                }
                "4" => match store.deactivate_all() {
                    Ok(()) => writeln!(self.output, "{}", "All alarms turned off!".red())?,
                    Err(e) => self.report(&e)?,
                },
                "5" => {
                    writeln!(self.output, "{}", "Goodbye!".yellow())?;
                    return Ok(());
                }
                _ => writeln!(self.output, "{}", "Invalid choice, try again!".red())?,
            }
        }
    }

    /// None once the input is exhausted
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn report(&mut self, error: &dyn std::error::Error) -> io::Result<()> {
        warn!("{error}");
        writeln!(self.output, "{}", error.to_string().red())
    }

    /// asks until it gets a valid number, None if the input ends first
    fn prompt_bounded(
        &mut self,
        prompt: &str,
        max: u32,
        too_big: fn(u32) -> InputError,
    ) -> io::Result<Option<u32>> {
        loop {
            let Some(line) = self.read_line(&prompt.yellow().to_string())? else {
                return Ok(None);
            };
            match parse_bounded(&line, max, too_big) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => self.report(&e)?,
            }
        }
    }

    /// returns false if the input ended before the alarm was complete
    fn add(&mut self, store: &mut AlarmStore) -> io::Result<bool> {
        let Some(hour) = self.prompt_bounded("Hour (0-23): ", 23, InputError::Hour)? else {
            return Ok(false);
        };
        let Some(minute) = self.prompt_bounded("Minute (0-59): ", 59, InputError::Minute)?
        else {
            return Ok(false);
        };

        let Some(days) = self.read_line(&format!(
            "{} (0 = Mon, 1 = Tue, ..., 6 = Sun), {}\n> ",
            "Days".yellow(),
            "separated by spaces, Enter for every day:".yellow()
        ))?
        else {
            return Ok(false);
        };
        let days = match parse_days(&days) {
            Ok(days) if !days.is_empty() => days,
            Ok(_) => EVERY_DAY.to_vec(),
            Err(e) => {
                self.report(&e)?;
                writeln!(self.output, "{}", "Using every day.".green())?;
                EVERY_DAY.to_vec()
            }
        };

        writeln!(self.output, "{}", "Sound:".yellow())?;
        for (i, sound) in MENU_SOUNDS.iter().enumerate() {
            writeln!(self.output, "{} {sound}", (i + 1).to_string().yellow())?;
        }
        let Some(sound) = self.read_line("> ")? else {
            return Ok(false);
        };
        let sound = sound_choice(&sound);

        let prompt = "Repeat every how many minutes (0 for no repeat): ".yellow();
        let Some(repeat) = self.read_line(&prompt.to_string())? else {
            return Ok(false);
        };
        let repeat = parse_repeat(&repeat);

        let Some(message) =
            self.read_line(&format!("Message (default \"{}\"): ", self.default_message))?
        else {
            return Ok(false);
        };
        let message = if message.is_empty() {
            self.default_message.clone()
        } else {
            message
        };

        match AlarmBuilder::new(hour, minute)
            .days(days)
            .sound(sound)
            .repeat_interval(repeat)
            .message(message)
            .build()
        {
            Ok(alarm) => {
                let summary = format!("Alarm set for {:02}:{:02}", alarm.hour, alarm.minute);
                if let Err(e) = store.add(alarm) {
                    self.report(&e)?;
                }
                writeln!(self.output, "{}", summary.green())?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(true)
    }

    /// returns false if the input ended
    fn remove(&mut self, store: &mut AlarmStore) -> io::Result<bool> {
        let Some(line) = self.read_line(&"Number of the alarm to remove: ".red().to_string())?
        else {
            return Ok(false);
        };
        // the list is numbered from 1
        match line.parse::<usize>() {
            Ok(number) if number > 0 => match store.remove_at(number - 1) {
                Ok(_) => writeln!(self.output, "{}", format!("Alarm {number} removed!").red())?,
                Err(e) => self.report(&e)?,
            },
            _ => self.report(&InputError::Number(line))?,
        }
        Ok(true)
    }
}
