//! Event processor: the per-actor queue, timers and run loop.
//!
//! An [`EventProcessor`] owns a bounded [`EventQueue`], a [`TimerSystem`] and
//! an application [`Reactor`]. Other threads talk to it only through a
//! cloneable [`ProcessorHandle`]. Once started, exactly one thread calls
//! [`EventProcessor::run`], so the reactor never needs its own locking.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Select;
use log::{debug, trace, warn};

use crate::config::ProcessorConfig;
use crate::event::{Event, EventId};
use crate::queue::{EventQueue, QueueSender};
use crate::registry::Registry;
use crate::source::EventSource;
use crate::time::{Clock, TimerId, TimerSystem};

/// Numeric identity of a processor, used in diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessorId(pub u32);

impl ProcessorId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Predicate selecting the user events a processor wants from broadcasts.
#[derive(Clone)]
pub struct Interest(Arc<dyn Fn(&Event) -> bool + Send + Sync>);

impl Interest {
    /// Every user event.
    pub fn all() -> Self {
        Self::from_fn(|_| true)
    }

    /// No user event. System events are still delivered.
    pub fn none() -> Self {
        Self::from_fn(|_| false)
    }

    /// Exactly the listed event ids.
    pub fn ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = EventId>,
    {
        let ids: HashSet<EventId> = ids.into_iter().collect();
        Self::from_fn(move |event| ids.contains(&event.id()))
    }

    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    #[inline]
    pub fn matches(&self, event: &Event) -> bool {
        (self.0)(event)
    }
}

impl Default for Interest {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Interest(..)")
    }
}

/// Application code reacting to the events of one processor.
pub trait Reactor: Send + 'static {
    /// Called once per delivered event, including system events and
    /// synthesized timer expiries.
    fn on_event(&mut self, ctx: &mut Context<'_>, event: &Event);

    /// User events this reactor wants to receive from broadcasts. Read once
    /// when the processor is built.
    fn interest(&self) -> Interest {
        Interest::all()
    }
}

struct Shared {
    id: ProcessorId,
    name: String,
    queue: QueueSender,
    interest: Interest,
}

/// Cloneable, thread-safe reference to a processor's inbox.
#[derive(Clone)]
pub struct ProcessorHandle(Arc<Shared>);

impl ProcessorHandle {
    pub fn id(&self) -> ProcessorId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Queues `event` for the processor. Callable from any thread.
    ///
    /// # Panics
    ///
    /// Panics after logging if the queue is full.
    pub fn push_event(&self, event: Event) {
        trace!("{self}: push {event}");
        self.0.queue.push(event);
    }

    /// Queues `event` unless the processor is gone; returns whether it was
    /// queued.
    pub(crate) fn try_push_event(&self, event: Event) -> bool {
        trace!("{self}: push {event}");
        self.0.queue.push_unless_closed(event)
    }

    /// System events are always of interest, user events per [`Interest`].
    pub fn is_event_of_interest(&self, event: &Event) -> bool {
        event.is_system() || self.is_user_event_of_interest(event)
    }

    pub fn is_user_event_of_interest(&self, event: &Event) -> bool {
        self.0.interest.matches(event)
    }

    /// Number of events waiting in the queue.
    pub fn pending(&self) -> usize {
        self.0.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.0.queue.capacity()
    }

    /// Whether both handles refer to the same processor.
    pub fn same_as(&self, other: &ProcessorHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for ProcessorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0.name, self.0.id)
    }
}

impl fmt::Debug for ProcessorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorHandle")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("pending", &self.pending())
            .finish()
    }
}

/// What a reactor can do while handling an event.
pub struct Context<'a> {
    handle: &'a ProcessorHandle,
    timers: &'a mut TimerSystem,
    registry: &'a Registry,
}

impl<'a> Context<'a> {
    pub fn id(&self) -> ProcessorId {
        self.handle.id()
    }

    pub fn handle(&self) -> &ProcessorHandle {
        self.handle
    }

    /// Broadcasts `event` to every interested processor, this one included.
    /// Returns how many processors received it.
    pub fn send_event(&self, event: Event) -> usize {
        self.registry.broadcast(event)
    }

    /// Queues `event` for this processor.
    pub fn push_self(&self, event: Event) {
        self.handle.push_event(event);
    }

    pub fn start_timer(&mut self, id: TimerId, delay: Duration) {
        self.timers.start_timer(id, delay);
    }

    pub fn start_cyclic_timer(&mut self, id: TimerId, period: Duration) {
        self.timers.start_cyclic_timer(id, period);
    }

    pub fn stop_timer(&mut self, id: TimerId) {
        self.timers.stop_timer(id);
    }

    pub fn pause_timer(&mut self, id: TimerId) -> bool {
        self.timers.pause_timer(id)
    }

    pub fn continue_timer(&mut self, id: TimerId) -> bool {
        self.timers.continue_timer(id)
    }

    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.timers.is_timer_active(id)
    }

    pub fn is_timer_paused(&self, id: TimerId) -> bool {
        self.timers.is_timer_paused(id)
    }

    pub fn timers(&self) -> &TimerSystem {
        self.timers
    }
}

/// Result of waiting for the next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    Event(Event),
    Timeout,
}

impl Received {
    pub fn event(self) -> Option<Event> {
        match self {
            Self::Event(event) => Some(event),
            Self::Timeout => None,
        }
    }
}

/// Builder for [`EventProcessor`].
pub struct ProcessorBuilder {
    id: ProcessorId,
    registry: Arc<Registry>,
    config: ProcessorConfig,
    source: Option<Box<dyn EventSource>>,
    timers: TimerSystem,
}

impl ProcessorBuilder {
    pub fn config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Polls `source` alongside the processor's own queue.
    pub fn source(mut self, source: impl EventSource) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Takes timer deadlines from `clock` instead of the monotonic clock.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.timers = TimerSystem::with_clock(clock);
        self
    }

    /// Builds the processor and registers it for broadcasts.
    pub fn build<R: Reactor>(self, reactor: R) -> EventProcessor<R> {
        let capacity = self.config.queue_capacity.max(1);
        let queue = EventQueue::new(capacity);
        let handle = ProcessorHandle(Arc::new(Shared {
            id: self.id,
            name: self.config.name,
            queue: queue.sender(),
            interest: reactor.interest(),
        }));
        self.registry.register(handle.clone());
        debug!("{handle}: created, queue capacity {capacity}");

        EventProcessor {
            handle,
            queue,
            timers: self.timers,
            reactor,
            source: self.source,
            registry: self.registry,
        }
    }
}

/// Queue, timers and reactor of one actor.
///
/// Registered with its [`Registry`] from construction until it is dropped.
pub struct EventProcessor<R> {
    handle: ProcessorHandle,
    queue: EventQueue,
    timers: TimerSystem,
    reactor: R,
    source: Option<Box<dyn EventSource>>,
    registry: Arc<Registry>,
}

impl EventProcessor<()> {
    pub fn builder(id: ProcessorId, registry: &Arc<Registry>) -> ProcessorBuilder {
        ProcessorBuilder {
            id,
            registry: Arc::clone(registry),
            config: ProcessorConfig::default(),
            source: None,
            timers: TimerSystem::new(),
        }
    }
}

impl<R: Reactor> EventProcessor<R> {
    /// Processor with default configuration.
    pub fn new(id: ProcessorId, registry: &Arc<Registry>, reactor: R) -> Self {
        EventProcessor::builder(id, registry).build(reactor)
    }

    pub fn id(&self) -> ProcessorId {
        self.handle.id()
    }

    pub fn handle(&self) -> &ProcessorHandle {
        &self.handle
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn push_event(&self, event: Event) {
        self.handle.push_event(event);
    }

    pub fn is_event_of_interest(&self, event: &Event) -> bool {
        self.handle.is_event_of_interest(event)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn reactor(&self) -> &R {
        &self.reactor
    }

    pub fn reactor_mut(&mut self) -> &mut R {
        &mut self.reactor
    }

    pub fn timers(&self) -> &TimerSystem {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut TimerSystem {
        &mut self.timers
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Waits for the next event for at most `max_wait`.
    ///
    /// `None` waits until something arrives; `Some(Duration::ZERO)` only
    /// checks. Queued events come first, then data already available from
    /// the external source.
    pub fn get_event(&mut self, max_wait: Option<Duration>) -> Received {
        if let Some(event) = self.queue.try_pop() {
            return Received::Event(event);
        }
        if let Some(source) = self.source.as_mut() {
            if source.has_data() {
                if let Some(event) = source.read_event() {
                    let _ = source.readiness().try_recv();
                    return Received::Event(event);
                }
            }
        }
        if max_wait == Some(Duration::ZERO) {
            return Received::Timeout;
        }

        if self.source.is_some() {
            return self.wait_with_source(max_wait);
        }
        let event = match max_wait {
            Some(timeout) => self.queue.pop_timeout(timeout),
            None => Some(self.queue.pop_blocking()),
        };
        event.map_or(Received::Timeout, Received::Event)
    }

    /// A readiness signal without data keeps waiting until `max_wait` has
    /// elapsed in total.
    fn wait_with_source(&mut self, max_wait: Option<Duration>) -> Received {
        let deadline = max_wait.map(|wait| Instant::now() + wait);
        let Self { queue, source, handle, .. } = self;
        loop {
            let Some(active) = source.as_mut() else {
                return Received::Timeout;
            };
            let ready = active.readiness().clone();

            let mut select = Select::new();
            let queue_index = select.recv(queue.receiver());
            select.recv(&ready);
            let operation = match deadline {
                Some(deadline) => match select.select_deadline(deadline) {
                    Ok(operation) => operation,
                    Err(_) => return Received::Timeout,
                },
                None => select.select(),
            };

            if operation.index() == queue_index {
                return match operation.recv(queue.receiver()) {
                    Ok(event) => Received::Event(event),
                    Err(_) => fatal!("{handle}: event queue disconnected"),
                };
            }
            match operation.recv(&ready) {
                Ok(()) => {
                    if let Some(event) = active.read_event() {
                        return Received::Event(event);
                    }
                    if let Some(event) = queue.try_pop() {
                        return Received::Event(event);
                    }
                    trace!("{handle}: source ready without data");
                }
                Err(_) => {
                    warn!("{handle}: event source closed, detaching it");
                    *source = None;
                    return Received::Timeout;
                }
            }
        }
    }

    /// Runs the event loop until a `FINISH` event has been handled.
    ///
    /// Each iteration handles at most one event and then at most one
    /// expired timer. The wait for the event is bounded by the earliest
    /// timer deadline.
    pub fn run(&mut self) {
        debug!("{}: run loop started", self.handle);
        loop {
            let max_wait = self.timers.max_wait_time();
            trace!("{}: waiting {:?}", self.handle, max_wait);

            if let Received::Event(event) = self.get_event(max_wait) {
                self.deliver(&event);
                if event.id() == EventId::FINISH {
                    break;
                }
            }

            if let Some(timer) = self.timers.next_timer() {
                trace!("{}: {timer} elapsed", self.handle);
                self.deliver(&Event::timer_elapsed(timer));
            }
        }
        debug!("{}: run loop finished", self.handle);
    }

    /// Hands `event` to the reactor.
    pub fn dispatch(&mut self, event: &Event) {
        self.deliver(event);
    }

    fn deliver(&mut self, event: &Event) {
        trace!("{}: dispatch {event}", self.handle);
        let mut ctx = Context {
            handle: &self.handle,
            timers: &mut self.timers,
            registry: &self.registry,
        };
        self.reactor.on_event(&mut ctx, event);
    }
}

impl<R> Drop for EventProcessor<R> {
    fn drop(&mut self) {
        self.registry.unregister(&self.handle);
        debug!("{}: dropped", self.handle);
    }
}

impl<R> fmt::Debug for EventProcessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventProcessor")
            .field("handle", &self.handle)
            .field("timers", &self.timers)
            .field("source", &self.source.is_some())
            .finish()
    }
}
