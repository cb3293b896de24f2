//! Bounded event queue owned by one processor.
//!
//! The queue doubles as the wake-up channel: a consumer blocked in
//! [`EventQueue::pop_timeout`] or [`EventQueue::pop_blocking`] is woken as
//! soon as any [`QueueSender`] pushes an event.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};

use crate::event::Event;

/// Consumer side of a processor's queue.
#[derive(Debug)]
pub struct EventQueue {
    sender: QueueSender,
    receiver: Receiver<Event>,
}

/// Cloneable producer side of an [`EventQueue`].
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: Sender<Event>,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, receiver) = bounded(capacity);
        Self {
            sender: QueueSender { tx, capacity },
            receiver,
        }
    }

    pub fn sender(&self) -> QueueSender {
        self.sender.clone()
    }

    pub(crate) fn receiver(&self) -> &Receiver<Event> {
        &self.receiver
    }

    /// Appends `event`. See [`QueueSender::push`].
    pub fn push(&self, event: Event) {
        self.sender.push(event);
    }

    /// Takes the oldest event without blocking.
    pub fn try_pop(&self) -> Option<Event> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => fatal!("event queue disconnected"),
        }
    }

    /// Takes the oldest event, waiting at most `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => fatal!("event queue disconnected"),
        }
    }

    /// Takes the oldest event, waiting as long as needed.
    pub fn pop_blocking(&self) -> Event {
        match self.receiver.recv() {
            Ok(event) => event,
            Err(_) => fatal!("event queue disconnected"),
        }
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity
    }
}

impl QueueSender {
    /// Appends `event` and wakes the consumer.
    ///
    /// # Panics
    ///
    /// Panics after logging if the queue is full: the queue was sized too
    /// small for the application.
    pub fn push(&self, event: Event) {
        if !self.push_unless_closed(event) {
            fatal!("event queue disconnected, cannot deliver {event}");
        }
    }

    /// Like [`push`](Self::push), but returns `false` instead of panicking
    /// when the receiving side is gone.
    pub(crate) fn push_unless_closed(&self, event: Event) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => fatal!(
                "event queue full ({} events), dropping {event}",
                self.capacity
            ),
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
