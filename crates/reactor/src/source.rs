//! External readiness sources polled alongside a processor's own queue.
//!
//! A source models I/O outside the runtime (a socket, a device, another
//! process). It signals readiness through a channel so the processor can wait
//! on its queue and on the source with a single timeout, and then produces
//! events through its own read routine.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::event::Event;

/// Hook for actors that also react to an external source.
pub trait EventSource: Send + 'static {
    /// Whether data can be read right now without waiting.
    fn has_data(&mut self) -> bool;

    /// Reads one event from the source. `None` means the readiness signal
    /// did not produce an event (for example a partial message).
    fn read_event(&mut self) -> Option<Event>;

    /// Channel that receives a unit value whenever the source becomes ready.
    fn readiness(&self) -> &Receiver<()>;
}

/// In-process source fed through a [`SourceFeeder`].
pub struct ChannelSource {
    events: Receiver<Event>,
    ready: Receiver<()>,
}

/// Producer side of a [`ChannelSource`].
#[derive(Debug, Clone)]
pub struct SourceFeeder {
    events: Sender<Event>,
    ready: Sender<()>,
}

impl ChannelSource {
    pub fn new() -> (Self, SourceFeeder) {
        let (event_tx, event_rx) = unbounded();
        let (ready_tx, ready_rx) = unbounded();
        (
            Self {
                events: event_rx,
                ready: ready_rx,
            },
            SourceFeeder {
                events: event_tx,
                ready: ready_tx,
            },
        )
    }
}

impl EventSource for ChannelSource {
    fn has_data(&mut self) -> bool {
        !self.events.is_empty()
    }

    fn read_event(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    fn readiness(&self) -> &Receiver<()> {
        &self.ready
    }
}

impl SourceFeeder {
    /// Makes `event` available to the source and signals readiness.
    /// Returns `false` once the source has been dropped.
    pub fn feed(&self, event: Event) -> bool {
        self.events.send(event).is_ok() && self.ready.send(()).is_ok()
    }
}
