#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(
    clippy::use_self,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::missing_panics_doc
)]

use std::{error::Error, fmt::Display, io, path::PathBuf};

use alarm_clock::{
    alarm::parse_days,
    config::{BackendKind, Config},
    error::InputError,
    menu::{write_alarms, Menu},
    sound, Alarm, AlarmBuilder, AlarmStore, Monitor,
};
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// config file to use instead of the one in the config directory
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// alarms file to use instead of the configured one
    #[clap(long, short)]
    file: Option<PathBuf>,
    /// sound backend to use instead of the configured one
    #[clap(long, short, value_enum)]
    backend: Option<BackendKind>,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write the default config file
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// add an alarm
    Add {
        #[clap(long)]
        hour: u32,
        #[clap(long)]
        minute: u32,
        /// days as numbers from 0 (monday) to 6 (sunday), every day if left out
        #[clap(long, default_value = "")]
        days: String,
        #[clap(long, default_value = alarm_clock::alarm::BEEP)]
        sound: String,
        /// minutes between repeats, 0 for none
        #[clap(long, default_value_t = 0)]
        repeat: u32,
        #[clap(long)]
        message: Option<String>,
    },
    /// list all alarms
    List,
    /// remove an alarm by its number in the list
    Remove { number: usize },
    /// turn off all alarms
    StopAll,
    /// start the alarm clock
    Run,
}

fn main() -> Result<(), Box<dyn Error>> {
    // initilize the logger
    if let Err(e) = simple_file_logger::init_logger!("alarm_clock") {
        eprintln!("couldn't initialize logger: {e:?}");
    }

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path()?,
    };

    if let Some(Command::Init { force }) = args.command {
        if force || !config_path.exists() {
            let config = Config::new();
            config.save(&config_path)?;
            std::fs::create_dir_all(&config.sounds_dir)?;
            println!("wrote {}", config_path.display());
        } else {
            println!(
                "{} already exists, use --force to overwrite it",
                config_path.display()
            );
        }
        return Ok(());
    }

    let mut config = Config::load_or_default(&config_path)?;
    if let Some(file) = args.file {
        config.alarms_file = file;
    }
    if let Some(backend) = args.backend {
        config.sound_backend = backend;
    }

    let (mut store, error) = AlarmStore::open(&config.alarms_file);
    if let Some(e) = error {
        eprintln!("{}", format!("{e}, starting with no alarms").red());
    }

    match args.command {
        Some(Command::Add {
            hour,
            minute,
            days,
            sound,
            repeat,
            message,
        }) => {
            let message = message.unwrap_or_else(|| config.default_message.clone());
            match build_alarm(hour, minute, &days, sound, repeat, message) {
                Ok(alarm) => {
                    println!("{}", format!("alarm set: {alarm}").green());
                    report(store.add(alarm));
                }
                Err(e) => show_error(&e),
            }
        }
        Some(Command::List) => write_alarms(&mut io::stdout().lock(), store.alarms())?,
        Some(Command::Remove { number }) => match number.checked_sub(1) {
            Some(index) => match store.remove_at(index) {
                Ok(alarm) => println!("{}", format!("removed {alarm}").red()),
                Err(e) => show_error(&e),
            },
            None => eprintln!("{}", "alarm numbers start at 1".red()),
        },
        Some(Command::StopAll) => {
            report(store.deactivate_all());
            println!("{}", "All alarms turned off!".red());
        }
        Some(Command::Run) => monitor(store, &config),
        None => {
            Menu::new(io::stdin().lock(), io::stdout(), config.default_message.clone())
                .run(&mut store)?;
            if store.is_empty() {
                println!("{}", "No alarms set.".red());
            } else {
                monitor(store, &config);
            }
        }
        Some(Command::Init { .. }) => unreachable!("handled before loading the store"),
    }
    Ok(())
}

fn build_alarm(
    hour: u32,
    minute: u32,
    days: &str,
    sound: String,
    repeat: u32,
    message: String,
) -> Result<Alarm, InputError> {
    let days = parse_days(days)?;
    AlarmBuilder::new(hour, minute)
        .days(days)
        .sound(sound)
        .repeat_interval(repeat)
        .message(message)
        .build()
}

fn show_error(e: &dyn Display) {
    log::warn!("{e}");
    eprintln!("{}", e.to_string().red());
}

fn report<T>(result: Result<T, alarm_clock::error::StoreError>) {
    if let Err(e) = result {
        show_error(&e);
    }
}

fn monitor(store: AlarmStore, config: &Config) {
    if store.is_empty() {
        println!("{}", "No alarms set.".red());
        return;
    }
    println!(
        "{}\n{}",
        "Alarm clock started.".red(),
        "Press Ctrl+C to quit".yellow()
    );
    let (mut monitor, _sender) =
        Monitor::new(store, sound::from_config(config), config.poll_interval());
    monitor.run();
}
