//! Crossbeam-backed progress channel.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sending half, handed to renamer, scanner and converter.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Events sent after the receiver is gone are dropped.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half, drained by the CLI's printing thread.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Blocks for each event until every sender has been dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// Unbounded: sending never blocks.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender nobody listens to
pub fn null_sender() -> EventSender {
    EventChannel::new().0
}
