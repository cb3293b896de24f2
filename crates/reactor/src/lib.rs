//! # reactor
//!
//! A small reactive runtime: each *active object* owns an [`EventProcessor`]
//! running on a dedicated thread. Processors receive [`Event`]s through a
//! bounded queue that any thread may push to, keep their own one-shot and
//! cyclic timers, and hand every event to an application [`Reactor`].
//!
//! ## Module Overview
//! - [`event`]     – Event identifiers, reserved system events.
//! - [`time`]      – Per-processor timer collection and clocks.
//! - [`queue`]     – Bounded event queue with timed waiting.
//! - [`source`]    – Optional external readiness sources.
//! - [`processor`] – The run loop and the reactive handler hook.
//! - [`registry`]  – Broadcast of events to every interested processor.
//! - [`active`]    – Thread lifecycle around a processor.
//! - [`machine`]   – Driving an [`hfsm`] state machine from a processor.
//! - [`config`]    – Processor and thread configuration builders.
//!
//! Fatal conditions (queue overflow, a broken queue, inconsistent registry
//! bookkeeping) are logged and then panic; release builds abort on panic.

#[macro_use]
mod macros;

pub mod active;
pub mod config;
pub mod event;
pub mod machine;
pub mod processor;
pub mod queue;
pub mod registry;
pub mod source;
pub mod time;

pub use active::{ActiveError, ActiveObject, ActiveState};
pub use config::{ActiveConfig, ActiveConfigBuilder, ProcessorConfig, ProcessorConfigBuilder};
pub use event::{Event, EventId};
pub use machine::{MachineData, MachineReactor, MachineTable};
pub use processor::{
    Context, EventProcessor, Interest, ProcessorBuilder, ProcessorHandle, ProcessorId, Reactor,
    Received,
};
pub use queue::{EventQueue, QueueSender};
pub use registry::Registry;
pub use source::{ChannelSource, EventSource, SourceFeeder};
pub use time::{Clock, ManualClock, MonotonicClock, TimerId, TimerSystem};

#[cfg(test)]
mod tests;
