//! Crossbeam-backed event plumbing between a scan and its observer.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::Event;

/// Engine side of an event channel. Clones share the channel, so every hash
/// worker can hold one.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Blocks only when a bounded channel is full. Events sent after the
    /// receiver is gone are dropped.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Observer side of an event channel
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Events in send order, ending once every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        split(unbounded())
    }

    /// A full channel holds the scan back until the observer catches up.
    /// Capacity zero makes every send a rendezvous.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        split(bounded(capacity))
    }
}

fn split((sender, receiver): (Sender<Event>, Receiver<Event>)) -> (EventSender, EventReceiver) {
    (EventSender { inner: sender }, EventReceiver { inner: receiver })
}

/// Sender whose receiver is already gone, for scans nobody watches
pub fn null_sender() -> EventSender {
    EventChannel::new().0
}
