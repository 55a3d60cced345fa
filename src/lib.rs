#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

/// alarm records and deciding when they are due
pub mod alarm;
pub mod communication;
pub mod config;
pub mod error;
/// interactive console menu
pub mod menu;
pub mod monitor;
pub mod sound;
pub mod store;

pub use alarm::{Alarm, AlarmBuilder, AlarmId};
pub use config::{BackendKind, Config};
pub use monitor::Monitor;
pub use store::AlarmStore;
