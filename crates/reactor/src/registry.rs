//! Broadcast registry shared by the processors of one application.
//!
//! Processors register themselves when built and unregister when dropped.
//! The registry lock is held for a whole broadcast, so a processor that is
//! being dropped is either delivered to completely or not at all. Pushing an
//! event never touches the registry, so no path takes the two locks in
//! opposite order.

use log::{debug, trace};
use parking_lot::Mutex;

use crate::event::Event;
use crate::processor::{ProcessorHandle, ProcessorId};

/// Set of live processors that receive broadcast events.
#[derive(Debug, Default)]
pub struct Registry {
    processors: Mutex<Vec<ProcessorHandle>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handle` to the broadcast set.
    ///
    /// # Panics
    ///
    /// Panics after logging if the processor is already registered.
    pub fn register(&self, handle: ProcessorHandle) {
        let mut processors = self.processors.lock();
        if processors.iter().any(|p| p.same_as(&handle)) {
            fatal!("{handle}: registered twice");
        }
        debug!("{handle}: registered ({} in total)", processors.len() + 1);
        processors.push(handle);
    }

    /// Removes `handle` from the broadcast set.
    ///
    /// # Panics
    ///
    /// Panics after logging if the processor is not registered.
    pub fn unregister(&self, handle: &ProcessorHandle) {
        let mut processors = self.processors.lock();
        match processors.iter().position(|p| p.same_as(handle)) {
            Some(pos) => {
                processors.remove(pos);
                debug!("{handle}: unregistered ({} left)", processors.len());
            }
            None => fatal!("{handle}: unregistered but never registered"),
        }
    }

    /// Pushes `event` to every registered processor interested in it and
    /// returns how many received it.
    pub fn broadcast(&self, event: Event) -> usize {
        let processors = self.processors.lock();
        let mut delivered = 0;
        for processor in processors.iter() {
            if processor.is_event_of_interest(&event) {
                processor.push_event(event);
                delivered += 1;
            }
        }
        trace!("broadcast {event} to {delivered} of {}", processors.len());
        delivered
    }

    pub fn contains(&self, handle: &ProcessorHandle) -> bool {
        self.processors.lock().iter().any(|p| p.same_as(handle))
    }

    /// Ids of the registered processors in registration order.
    pub fn ids(&self) -> Vec<ProcessorId> {
        self.processors.lock().iter().map(ProcessorHandle::id).collect()
    }

    pub fn len(&self) -> usize {
        self.processors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.lock().is_empty()
    }
}
