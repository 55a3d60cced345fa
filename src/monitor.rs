//! The once-a-second loop that goes off when alarms are due.

use std::{
    collections::HashMap,
    fmt::Display,
    io::{self, Stdout, Write},
    ops::ControlFlow,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    time::Duration,
};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use colored::Colorize;
use log::{debug, info, warn};

use crate::{
    alarm::AlarmId,
    communication::{Message, MessageType, ThreadTimer, Timer},
    sound::SoundBackend,
    store::AlarmStore,
};

/// date, hour and minute an alarm last went off in
type FiredMinute = (NaiveDate, u32, u32);

fn minute_of(now: &NaiveDateTime) -> FiredMinute {
    (now.date(), now.hour(), now.minute())
}

pub struct Monitor<T: Timer = ThreadTimer, W: Write = Stdout> {
    store: AlarmStore,
    sound: Box<dyn SoundBackend>,
    timer: T,
    receiver: Receiver<Message>,
    poll_interval: Duration,
    // alarm messages and sound/save failures
    output: W,
    // alarms are checked many times inside their minute but only go off once
    last_fired: HashMap<AlarmId, FiredMinute>,
}

impl Monitor<ThreadTimer> {
    /// A monitor whose repeats run on background threads.
    /// The returned sender can be used to stop [`Monitor::run`].
    #[must_use]
    pub fn new(
        store: AlarmStore,
        sound: Box<dyn SoundBackend>,
        poll_interval: Duration,
    ) -> (Self, Sender<Message>) {
        let (sender, receiver) = mpsc::channel();
        let timer = ThreadTimer::new(sender.clone());
        (
            Self::with_timer(store, sound, timer, receiver, poll_interval),
            sender,
        )
    }
}

impl<T: Timer> Monitor<T> {
    /// writes to stdout, use [`Monitor::with_output`] to send it elsewhere
    #[must_use]
    pub fn with_timer(
        store: AlarmStore,
        sound: Box<dyn SoundBackend>,
        timer: T,
        receiver: Receiver<Message>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            sound,
            timer,
            receiver,
            poll_interval,
            output: io::stdout(),
            last_fired: HashMap::new(),
        }
    }
}

impl<T: Timer, W: Write> Monitor<T, W> {
    #[must_use]
    pub fn with_output<O: Write>(self, output: O) -> Monitor<T, O> {
        Monitor {
            store: self.store,
            sound: self.sound,
            timer: self.timer,
            receiver: self.receiver,
            poll_interval: self.poll_interval,
            output,
            last_fired: self.last_fired,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &AlarmStore {
        &self.store
    }

    #[must_use]
    pub const fn timer(&self) -> &T {
        &self.timer
    }

    #[must_use]
    pub const fn output(&self) -> &W {
        &self.output
    }

    #[must_use]
    pub fn into_store(self) -> AlarmStore {
        self.store
    }

    /// Checks every alarm against `now` and sets off the due ones that haven't gone off in
    /// this minute yet. Returns the ids that went off.
    pub fn tick_at(&mut self, now: NaiveDateTime) -> Vec<AlarmId> {
        let minute = minute_of(&now);
        let due: Vec<AlarmId> = self
            .store
            .alarms()
            .iter()
            .filter(|alarm| alarm.is_due(&now))
            .filter(|alarm| self.last_fired.get(&alarm.id) != Some(&minute))
            .map(|alarm| alarm.id)
            .collect();
        for id in &due {
            self.last_fired.insert(*id, minute);
            self.fire(*id);
        }
        due
    }

    /// [`Monitor::handle_at`] with the local time
    pub fn handle(&mut self, message: Message) -> ControlFlow<()> {
        self.handle_at(message, chrono::Local::now().naive_local())
    }

    /// Reacts to a message from a timer that arrived at `now`, breaking on shutdown.
    /// A repeat counts as the alarm's fire for that minute, in either order with a tick.
    pub fn handle_at(&mut self, message: Message, now: NaiveDateTime) -> ControlFlow<()> {
        match message {
            Message {
                kind: MessageType::RepeatDue,
                alarm_id: Some(id),
            } => {
                let minute = minute_of(&now);
                if !self.store.get(id).is_some_and(|alarm| alarm.active) {
                    debug!("alarm {id} was turned off or removed, ending its repeats");
                    self.timer.cancel(id);
                } else if self.last_fired.get(&id) == Some(&minute) {
                    // a tick already set it off and armed a fresh repeat
                    debug!("alarm {id} already went off this minute");
                } else {
                    self.last_fired.insert(id, minute);
                    self.fire(id);
                }
                ControlFlow::Continue(())
            }
            Message {
                kind: MessageType::RepeatDue,
                alarm_id: None,
            } => ControlFlow::Continue(()),
            Message {
                kind: MessageType::Shutdown,
                ..
            } => ControlFlow::Break(()),
        }
    }

    fn say(&mut self, line: impl Display) {
        if let Err(e) = writeln!(self.output, "{line}").and_then(|()| self.output.flush()) {
            warn!("couldn't write to the output: {e}");
        }
    }

    /// shows the message, plays the sound, then either turns a one shot alarm off or
    /// schedules the next repeat
    fn fire(&mut self, id: AlarmId) {
        let Some(alarm) = self.store.get(id) else {
            return;
        };
        let (message, sound, repeat_interval) =
            (alarm.message.clone(), alarm.sound.clone(), alarm.repeat_interval);

        info!("alarm {id} going off: {message}");
        self.say(format!("\n{}", format!("!!! {message} !!!").red().bold()));
        if let Err(e) = self.sound.play(&sound) {
            warn!("couldn't play sound for alarm {id}: {e}");
            self.say(e.to_string().yellow());
        }

        if repeat_interval > 0 {
            self.timer
                .arm(id, Duration::from_secs(u64::from(repeat_interval) * 60));
        } else if let Err(e) = self.store.deactivate(id) {
            warn!("couldn't save alarm {id} as turned off: {e}");
            self.say(e.to_string().red());
        }
    }

    /// Polls until a shutdown message arrives. Waiting for messages is also the pause between
    /// polls.
    pub fn run(&mut self) {
        info!(
            "monitoring {} alarms with the {} sound backend",
            self.store.len(),
            self.sound.name()
        );
        loop {
            self.tick_at(chrono::Local::now().naive_local());
            match self.receiver.recv_timeout(self.poll_interval) {
                Ok(message) => {
                    if self
                        .handle_at(message, chrono::Local::now().naive_local())
                        .is_break()
                    {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("monitor stopped");
    }
}
