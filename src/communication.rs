use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread,
    time::Duration,
};

use log::debug;

use crate::alarm::AlarmId;

/// what the monitor loop gets told by its timers (or whoever wants it to stop)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageType,
    pub alarm_id: Option<AlarmId>,
}

impl Message {
    #[must_use]
    pub const fn new(kind: MessageType, alarm_id: Option<AlarmId>) -> Self {
        Self { kind, alarm_id }
    }

    #[must_use]
    pub const fn repeat_due(alarm_id: AlarmId) -> Self {
        Self::new(MessageType::RepeatDue, Some(alarm_id))
    }

    #[must_use]
    pub const fn shutdown() -> Self {
        Self::new(MessageType::Shutdown, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// a repeating alarm's interval ran out
    RepeatDue,
    Shutdown,
}

/// Delayed one shot callbacks for repeating alarms, one pending callback per alarm.
pub trait Timer {
    /// Arrange for a [`MessageType::RepeatDue`] for `alarm_id` after `delay`,
    /// replacing whatever was pending for that alarm.
    fn arm(&mut self, alarm_id: AlarmId, delay: Duration);

    fn cancel(&mut self, alarm_id: AlarmId);
}

/// Sleeps on a detached thread per armed alarm and then messages the monitor.
/// Threads are never joined, a cancelled one just doesn't send.
#[derive(Debug)]
pub struct ThreadTimer {
    sender: Sender<Message>,
    pending: HashMap<AlarmId, Arc<AtomicBool>>,
}

impl ThreadTimer {
    #[must_use]
    pub fn new(sender: Sender<Message>) -> Self {
        Self {
            sender,
            pending: HashMap::new(),
        }
    }
}

impl Timer for ThreadTimer {
    fn arm(&mut self, alarm_id: AlarmId, delay: Duration) {
        self.cancel(alarm_id);
        let cancelled = Arc::new(AtomicBool::new(false));
        self.pending.insert(alarm_id, Arc::clone(&cancelled));
        let sender = self.sender.clone();
        debug!("repeating alarm {alarm_id} in {}s", delay.as_secs());
        thread::spawn(move || {
            thread::sleep(delay);
            if !cancelled.load(Ordering::Acquire) {
                // the monitor is gone if this fails, nothing left to tell
                let _ = sender.send(Message::repeat_due(alarm_id));
            }
        });
    }

    fn cancel(&mut self, alarm_id: AlarmId) {
        if let Some(cancelled) = self.pending.remove(&alarm_id) {
            cancelled.store(true, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::alarm::get_uid;

    #[test]
    fn armed_timer_messages_after_delay() {
        let (tx, rx) = mpsc::channel();
        let mut timer = ThreadTimer::new(tx);
        let id = get_uid();
        timer.arm(id, Duration::from_millis(10));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Message::repeat_due(id)
        );
    }

    #[test]
    fn cancelled_timer_stays_quiet() {
        let (tx, rx) = mpsc::channel();
        let mut timer = ThreadTimer::new(tx);
        let id = get_uid();
        timer.arm(id, Duration::from_millis(50));
        timer.cancel(id);
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn rearming_replaces_the_pending_timer() {
        let (tx, rx) = mpsc::channel();
        let mut timer = ThreadTimer::new(tx);
        let id = get_uid();
        timer.arm(id, Duration::from_millis(50));
        timer.arm(id, Duration::from_millis(60));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Message::repeat_due(id)
        );
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }
}
