//! Per-processor timers.
//!
//! Every processor keeps its own [`TimerSystem`]. Active timers are held in
//! deadline order so the run loop can bound its blocking wait by the earliest
//! deadline; paused timers remember only the time that was left.
//!
//! Deadlines come from a [`Clock`]. The default [`MonotonicClock`] is not
//! affected by wall-clock adjustments; [`ManualClock`] lets tests move time
//! explicitly.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace};
use parking_lot::Mutex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a timer, unique within one processor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u8);

impl From<u8> for TimerId {
    #[inline]
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TIMER({})", self.0)
    }
}

/// Source of the current instant.
pub trait Clock: Send + 'static {
    fn now(&self) -> Instant;
}

/// System monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveTimer {
    id: TimerId,
    deadline: Instant,
    period: Duration,
    cyclic: bool,
}

#[derive(Debug, Clone, Copy)]
struct PausedTimer {
    id: TimerId,
    remaining: Duration,
    period: Duration,
    cyclic: bool,
}

/// Ordered collection of the timers of one processor.
///
/// At most one timer exists per [`TimerId`] across the active and paused
/// sets; starting a timer replaces any previous timer with the same id.
pub struct TimerSystem {
    clock: Box<dyn Clock>,
    active: VecDeque<ActiveTimer>,
    paused: Vec<PausedTimer>,
}

impl TimerSystem {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock)
    }

    pub fn with_clock(clock: impl Clock) -> Self {
        Self {
            clock: Box::new(clock),
            active: VecDeque::new(),
            paused: Vec::new(),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Arms a one-shot timer firing `delay` from now.
    pub fn start_timer(&mut self, id: TimerId, delay: Duration) {
        self.arm(id, delay, false);
    }

    /// Arms a timer firing every `period`, first after one period.
    pub fn start_cyclic_timer(&mut self, id: TimerId, period: Duration) {
        self.arm(id, period, true);
    }

    fn arm(&mut self, id: TimerId, delay: Duration, cyclic: bool) {
        self.stop_timer(id);
        let deadline = self.clock.now() + delay;
        trace!("{id} armed: delay {delay:?}, cyclic {cyclic}");
        self.insert(ActiveTimer {
            id,
            deadline,
            period: delay,
            cyclic,
        });
    }

    fn insert(&mut self, timer: ActiveTimer) {
        // Insert after timers with an equal deadline so equal deadlines fire
        // in arming order.
        let pos = self
            .active
            .partition_point(|other| other.deadline <= timer.deadline);
        self.active.insert(pos, timer);
    }

    /// Removes the timer from either set. Unknown ids are ignored.
    pub fn stop_timer(&mut self, id: TimerId) {
        if let Some(pos) = self.active.iter().position(|t| t.id == id) {
            debug!("{id} stopped");
            self.active.remove(pos);
        }
        if let Some(pos) = self.paused.iter().position(|t| t.id == id) {
            self.paused.remove(pos);
        }
    }

    /// Freezes an active timer, keeping the time left until its deadline.
    pub fn pause_timer(&mut self, id: TimerId) -> bool {
        let Some(pos) = self.active.iter().position(|t| t.id == id) else {
            return false;
        };
        let now = self.clock.now();
        let Some(timer) = self.active.remove(pos) else {
            return false;
        };
        let remaining = timer.deadline.saturating_duration_since(now);
        debug!("{id} paused with {remaining:?} left");
        self.paused.push(PausedTimer {
            id,
            remaining,
            period: timer.period,
            cyclic: timer.cyclic,
        });
        true
    }

    /// Resumes a paused timer; it fires after the time that was left when it
    /// was paused.
    pub fn continue_timer(&mut self, id: TimerId) -> bool {
        let Some(pos) = self.paused.iter().position(|t| t.id == id) else {
            return false;
        };
        let timer = self.paused.remove(pos);
        debug!("{id} continued with {:?} left", timer.remaining);
        self.insert(ActiveTimer {
            id,
            deadline: self.clock.now() + timer.remaining,
            period: timer.period,
            cyclic: timer.cyclic,
        });
        true
    }

    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.active.iter().any(|t| t.id == id)
    }

    pub fn is_timer_paused(&self, id: TimerId) -> bool {
        self.paused.iter().any(|t| t.id == id)
    }

    /// Longest the owner may block before the earliest timer is due.
    ///
    /// `None` means no timer is active and the owner may block indefinitely.
    /// An overdue timer yields `Some(Duration::ZERO)`.
    pub fn max_wait_time(&self) -> Option<Duration> {
        self.active
            .front()
            .map(|first| first.deadline.saturating_duration_since(self.clock.now()))
    }

    /// Pops the earliest timer if it is due and returns its id. A cyclic
    /// timer is re-armed one period from now.
    pub fn next_timer(&mut self) -> Option<TimerId> {
        let first = *self.active.front()?;
        if first.deadline > self.clock.now() {
            return None;
        }
        self.active.pop_front();
        if first.cyclic {
            self.start_cyclic_timer(first.id, first.period);
        }
        trace!("{} elapsed", first.id);
        Some(first.id)
    }

    /// Active timers and their deadlines, earliest first.
    pub fn active(&self) -> impl Iterator<Item = (TimerId, Instant)> + '_ {
        self.active.iter().map(|t| (t.id, t.deadline))
    }

    /// Paused timers and the time they had left.
    pub fn paused(&self) -> impl Iterator<Item = (TimerId, Duration)> + '_ {
        self.paused.iter().map(|t| (t.id, t.remaining))
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.paused.is_empty()
    }
}

impl Default for TimerSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerSystem")
            .field("active", &self.active)
            .field("paused", &self.paused)
            .finish()
    }
}
