//! Event channel built on crossbeam-channel.
//!
//! Worker threads of the pipeline share clones of one [`EventSender`];
//! the UI drains the matching [`EventReceiver`].

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::Event;

/// Cloneable, thread-safe sending half
#[derive(Clone)]
pub struct EventSender {
    inner: Option<Sender<Event>>,
}

impl EventSender {
    /// Send an event.
    ///
    /// Progress is optional: a dropped receiver or a null sender discards
    /// the event.
    pub fn send(&self, event: Event) {
        if let Some(inner) = &self.inner {
            let _ = inner.send(event);
        }
    }

    /// Whether anything can still observe events
    pub fn is_listening(&self) -> bool {
        self.inner.is_some()
    }
}

/// Receiving half used by UI layers
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event, `None` once every sender is gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Next event if one is queued
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructors for connected sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel; events are small and the pipeline never waits
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        Self::wrap(unbounded())
    }

    /// Bounded channel for UIs that want backpressure
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        Self::wrap(bounded(capacity))
    }

    fn wrap((sender, receiver): (Sender<Event>, Receiver<Event>)) -> (EventSender, EventReceiver) {
        (
            EventSender {
                inner: Some(sender),
            },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender that drops every event.
///
/// Used by `Pipeline::run` and by tests.
pub fn null_sender() -> EventSender {
    EventSender { inner: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, ThumbnailEvent};
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn events_cross_threads() {
        let (sender, receiver) = EventChannel::new();

        let worker = sender.clone();
        let handle = thread::spawn(move || {
            worker.send(Event::Thumbnail(ThumbnailEvent::Generated {
                source: PathBuf::from("/photos/a.jpg"),
                target: PathBuf::from("/cache/normal/x.png"),
            }));
        });
        handle.join().unwrap();
        drop(sender);

        let events: Vec<_> = receiver.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            Event::Thumbnail(ThumbnailEvent::Generated { source, .. }) if source.ends_with("a.jpg")
        ));
    }

    #[test]
    fn null_sender_discards_events() {
        let sender = null_sender();
        assert!(!sender.is_listening());
        sender.send(Event::Pipeline(PipelineEvent::Started));
    }

    #[test]
    fn dropped_receiver_is_not_an_error() {
        let (sender, receiver) = EventChannel::bounded(1);
        drop(receiver);
        sender.send(Event::Pipeline(PipelineEvent::Started));
        sender.send(Event::Pipeline(PipelineEvent::Started));
    }

    #[test]
    fn try_recv_drains_queue() {
        let (sender, receiver) = EventChannel::bounded(2);
        sender.send(Event::Pipeline(PipelineEvent::Started));

        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_none());
    }
}
