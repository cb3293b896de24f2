//! Active objects: an [`EventProcessor`] bound to a dedicated thread.
//!
//! `start` moves the processor onto a new thread running its event loop.
//! `stop` pushes `FINISH`, joins the thread and takes the processor back, so
//! the object can be inspected or started again.

use std::fmt;
use std::io;
use std::mem;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, SendError};
use log::{debug, error, warn};
use thiserror::Error;

use crate::config::ActiveConfig;
use crate::event::Event;
use crate::processor::{EventProcessor, ProcessorHandle, ProcessorId, Reactor};

/// Lifecycle of an [`ActiveObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveState {
    /// Never started.
    Idle,
    /// Event loop running on its own thread.
    Running,
    /// Thread joined; the processor is parked again.
    Stopped,
}

/// Usage and thread errors of an [`ActiveObject`].
#[derive(Debug, Error)]
pub enum ActiveError {
    #[error("active object {0} is already running")]
    AlreadyRunning(ProcessorId),
    #[error("active object {0} is not running")]
    NotRunning(ProcessorId),
    #[error("failed to spawn active object thread")]
    Spawn(#[source] io::Error),
    /// The event loop panicked; the processor is lost and cannot restart.
    #[error("active object {0} panicked")]
    Panicked(ProcessorId),
}

enum Slot<R> {
    Parked(EventProcessor<R>),
    Running(JoinHandle<Option<EventProcessor<R>>>),
    Lost,
}

/// A processor together with the thread that runs it.
pub struct ActiveObject<R: Reactor> {
    handle: ProcessorHandle,
    config: ActiveConfig,
    state: ActiveState,
    slot: Slot<R>,
}

impl<R: Reactor> ActiveObject<R> {
    pub fn new(processor: EventProcessor<R>) -> Self {
        Self::with_config(processor, ActiveConfig::default())
    }

    pub fn with_config(processor: EventProcessor<R>, config: ActiveConfig) -> Self {
        Self {
            handle: processor.handle().clone(),
            config,
            state: ActiveState::Idle,
            slot: Slot::Parked(processor),
        }
    }

    pub fn id(&self) -> ProcessorId {
        self.handle.id()
    }

    pub fn handle(&self) -> &ProcessorHandle {
        &self.handle
    }

    pub fn state(&self) -> ActiveState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ActiveState::Running
    }

    /// Queues `event` for the wrapped processor.
    pub fn push_event(&self, event: Event) {
        self.handle.push_event(event);
    }

    /// The wrapped processor while no thread owns it.
    pub fn processor(&self) -> Option<&EventProcessor<R>> {
        match &self.slot {
            Slot::Parked(processor) => Some(processor),
            _ => None,
        }
    }

    pub fn processor_mut(&mut self) -> Option<&mut EventProcessor<R>> {
        match &mut self.slot {
            Slot::Parked(processor) => Some(processor),
            _ => None,
        }
    }

    /// Spawns the thread running the processor's event loop.
    pub fn start(&mut self) -> Result<(), ActiveError> {
        let id = self.id();
        let processor = match mem::replace(&mut self.slot, Slot::Lost) {
            Slot::Parked(processor) => processor,
            Slot::Running(worker) => {
                self.slot = Slot::Running(worker);
                return Err(ActiveError::AlreadyRunning(id));
            }
            Slot::Lost => return Err(ActiveError::Panicked(id)),
        };

        let name = self
            .config
            .thread_name
            .clone()
            .unwrap_or_else(|| self.handle.name().to_owned());
        let mut builder = thread::Builder::new().name(name);
        if let Some(size) = self.config.stack_size {
            builder = builder.stack_size(size);
        }

        let (tx, rx) = bounded::<EventProcessor<R>>(1);
        let worker = match builder.spawn(move || {
            let mut processor = rx.recv().ok()?;
            processor.run();
            Some(processor)
        }) {
            Ok(worker) => worker,
            Err(err) => {
                error!("{}: cannot spawn thread: {err}", self.handle);
                self.slot = Slot::Parked(processor);
                return Err(ActiveError::Spawn(err));
            }
        };

        if let Err(SendError(processor)) = tx.send(processor) {
            let _ = worker.join();
            self.slot = Slot::Parked(processor);
            return Err(ActiveError::Panicked(id));
        }

        self.slot = Slot::Running(worker);
        self.state = ActiveState::Running;
        debug!("{}: started", self.handle);
        Ok(())
    }

    /// Pushes `FINISH` and waits for the event loop to exit.
    pub fn stop(&mut self) -> Result<(), ActiveError> {
        let id = self.id();
        let worker = match mem::replace(&mut self.slot, Slot::Lost) {
            Slot::Running(worker) => worker,
            other => {
                self.slot = other;
                return Err(ActiveError::NotRunning(id));
            }
        };

        if !self.handle.try_push_event(Event::finish()) {
            debug!("{}: event loop already gone", self.handle);
        }
        let joined = worker.join();
        self.state = ActiveState::Stopped;
        match joined {
            Ok(Some(processor)) => {
                self.slot = Slot::Parked(processor);
                debug!("{}: stopped", self.handle);
                Ok(())
            }
            Ok(None) | Err(_) => {
                error!("{}: event loop panicked", self.handle);
                Err(ActiveError::Panicked(id))
            }
        }
    }
}

impl<R: Reactor> Drop for ActiveObject<R> {
    fn drop(&mut self) {
        if self.is_running() {
            if let Err(err) = self.stop() {
                warn!("{}: stop on drop failed: {err}", self.handle);
            }
        }
    }
}

impl<R: Reactor> fmt::Debug for ActiveObject<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveObject")
            .field("handle", &self.handle)
            .field("state", &self.state)
            .finish()
    }
}
