//! Driving an [`hfsm`] state machine from a processor.
//!
//! State actions and handlers only see the machine's instance data, a
//! [`MachineData`]. Timer and send requests made there are queued and
//! carried out on the processor's [`Context`] once the event has been fully
//! processed, in the order they were made.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use hfsm::{Outcome, StateId, StateMachine, StateTable};
use log::{debug, trace, warn};

use crate::event::{Event, EventId};
use crate::processor::{Context, Interest, ProcessorId, Reactor};
use crate::time::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    StartTimer(TimerId, Duration),
    StartCyclicTimer(TimerId, Duration),
    StopTimer(TimerId),
    PauseTimer(TimerId),
    ContinueTimer(TimerId),
    Send(Event),
    PushSelf(Event),
}

/// Instance data of a machine plus the processor requests made while
/// handling the current event.
///
/// Dereferences to the application data.
pub struct MachineData<D> {
    data: D,
    processor: ProcessorId,
    commands: Vec<Command>,
}

impl<D> MachineData<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            processor: ProcessorId::default(),
            commands: Vec::new(),
        }
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    pub fn into_inner(self) -> D {
        self.data
    }

    /// Processor that delivered the current event.
    pub fn processor_id(&self) -> ProcessorId {
        self.processor
    }

    pub fn start_timer(&mut self, id: TimerId, delay: Duration) {
        self.commands.push(Command::StartTimer(id, delay));
    }

    pub fn start_cyclic_timer(&mut self, id: TimerId, period: Duration) {
        self.commands.push(Command::StartCyclicTimer(id, period));
    }

    pub fn stop_timer(&mut self, id: TimerId) {
        self.commands.push(Command::StopTimer(id));
    }

    pub fn pause_timer(&mut self, id: TimerId) {
        self.commands.push(Command::PauseTimer(id));
    }

    pub fn continue_timer(&mut self, id: TimerId) {
        self.commands.push(Command::ContinueTimer(id));
    }

    /// Broadcasts `event` once the current event is processed.
    pub fn send_event(&mut self, event: Event) {
        self.commands.push(Command::Send(event));
    }

    /// Queues `event` for the owning processor.
    pub fn push_self(&mut self, event: Event) {
        self.commands.push(Command::PushSelf(event));
    }

    /// Number of requests not yet carried out.
    pub fn pending_requests(&self) -> usize {
        self.commands.len()
    }

    fn apply(&mut self, ctx: &mut Context<'_>) {
        for command in self.commands.drain(..) {
            match command {
                Command::StartTimer(id, delay) => ctx.start_timer(id, delay),
                Command::StartCyclicTimer(id, period) => ctx.start_cyclic_timer(id, period),
                Command::StopTimer(id) => ctx.stop_timer(id),
                Command::PauseTimer(id) => {
                    if !ctx.pause_timer(id) {
                        trace!("{}: pause of inactive {id} ignored", ctx.handle());
                    }
                }
                Command::ContinueTimer(id) => {
                    if !ctx.continue_timer(id) {
                        trace!("{}: continue of unpaused {id} ignored", ctx.handle());
                    }
                }
                Command::Send(event) => {
                    ctx.send_event(event);
                }
                Command::PushSelf(event) => ctx.push_self(event),
            }
        }
    }
}

impl<D> Deref for MachineData<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.data
    }
}

impl<D> DerefMut for MachineData<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.data
    }
}

impl<D: fmt::Debug> fmt::Debug for MachineData<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineData")
            .field("data", &self.data)
            .field("pending_requests", &self.commands.len())
            .finish()
    }
}

/// State table type driven by a [`MachineReactor`].
pub type MachineTable<S, D> = StateTable<S, MachineData<D>, Event>;

/// Reactor forwarding every delivered event to a state machine.
///
/// The machine is started by the first `INIT` event; events delivered before
/// that are dropped.
pub struct MachineReactor<S, D> {
    machine: StateMachine<S, MachineData<D>, Event>,
    data: MachineData<D>,
    interest: Interest,
}

impl<S: StateId, D> MachineReactor<S, D> {
    pub fn new(table: Arc<MachineTable<S, D>>, data: D) -> Self {
        Self {
            machine: StateMachine::new(table),
            data: MachineData::new(data),
            interest: Interest::all(),
        }
    }

    /// User events this reactor receives from broadcasts.
    pub fn with_interest(mut self, interest: Interest) -> Self {
        self.interest = interest;
        self
    }

    pub fn machine(&self) -> &StateMachine<S, MachineData<D>, Event> {
        &self.machine
    }

    pub fn current(&self) -> S {
        self.machine.current()
    }

    pub fn is_started(&self) -> bool {
        self.machine.is_started()
    }

    pub fn data(&self) -> &D {
        self.data.data()
    }

    pub fn data_mut(&mut self) -> &mut D {
        self.data.data_mut()
    }
}

impl<S, D> Reactor for MachineReactor<S, D>
where
    S: StateId,
    D: Send + 'static,
{
    fn on_event(&mut self, ctx: &mut Context<'_>, event: &Event) {
        self.data.processor = ctx.id();

        if !self.machine.is_started() {
            if event.id() == EventId::INIT {
                match self.machine.start(&mut self.data) {
                    Ok(state) => debug!("{}: machine started in {state:?}", ctx.handle()),
                    Err(err) => warn!("{}: cannot start machine: {err}", ctx.handle()),
                }
            } else {
                trace!("{}: {event} dropped, machine not started", ctx.handle());
            }
        } else {
            match self.machine.dispatch(&mut self.data, event) {
                Ok(Outcome::Transition { source, state }) => {
                    debug!("{}: {event} moved {source:?} to {state:?}", ctx.handle());
                }
                Ok(Outcome::Handled { by }) => trace!("{}: {event} handled by {by:?}", ctx.handle()),
                Ok(Outcome::Unhandled) => trace!("{}: {event} unhandled", ctx.handle()),
                Err(err) => warn!("{}: dispatch of {event} failed: {err}", ctx.handle()),
            }
        }

        self.data.apply(ctx);
    }

    fn interest(&self) -> Interest {
        self.interest.clone()
    }
}

impl<S: StateId, D: fmt::Debug> fmt::Debug for MachineReactor<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineReactor")
            .field("current", &self.machine.current())
            .field("started", &self.machine.is_started())
            .field("data", &self.data)
            .finish()
    }
}
