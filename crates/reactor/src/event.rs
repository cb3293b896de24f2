//! Event identifiers and the event value exchanged between processors.
//!
//! An event is a numeric identifier plus an integer parameter. Identifiers in
//! the `0x0100_0000..=0x0600_0000` range are reserved for the runtime itself;
//! applications use small numbers for their own events.

use core::fmt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::time::TimerId;

/// Identifier of an event.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u32);

impl EventId {
    pub const INIT: Self = Self(0x0100_0000);
    pub const ENTRY: Self = Self(0x0200_0000);
    pub const EXIT: Self = Self(0x0300_0000);
    /// Base of the timer band; `TIMEOUT + n` reports expiry of timer `n`.
    pub const TIMEOUT: Self = Self(0x0400_0000);
    pub const START: Self = Self(0x0500_0000);
    pub const FINISH: Self = Self(0x0600_0000);

    /// Identifier reporting that timer `timer` elapsed.
    pub const fn timer_elapsed(timer: TimerId) -> Self {
        Self(Self::TIMEOUT.0 + timer.0 as u32)
    }

    /// Timer reported by this identifier, if it lies in the timer band.
    pub const fn as_timer(self) -> Option<TimerId> {
        if self.0 >= Self::TIMEOUT.0 && self.0 <= Self::TIMEOUT.0 + u8::MAX as u32 {
            Some(TimerId((self.0 - Self::TIMEOUT.0) as u8))
        } else {
            None
        }
    }

    /// Reserved identifiers every processor is interested in, whatever its
    /// own filter says.
    pub const fn is_system(self) -> bool {
        matches!(
            self,
            Self::INIT | Self::ENTRY | Self::EXIT | Self::START | Self::FINISH
        ) || self.as_timer().is_some()
    }
}

impl From<u32> for EventId {
    #[inline]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INIT => write!(f, "INIT"),
            Self::ENTRY => write!(f, "ENTRY"),
            Self::EXIT => write!(f, "EXIT"),
            Self::START => write!(f, "START"),
            Self::FINISH => write!(f, "FINISH"),
            id => match id.as_timer() {
                Some(timer) => write!(f, "TIMER_ELAPSED({})", timer.0),
                None => write!(f, "EVT({:#x})", id.0),
            },
        }
    }
}

/// Immutable message delivered to processors.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    id: EventId,
    param: i32,
}

impl Event {
    pub fn new(id: impl Into<EventId>) -> Self {
        Self::with_param(id, 0)
    }

    pub fn with_param(id: impl Into<EventId>, param: i32) -> Self {
        Self {
            id: id.into(),
            param,
        }
    }

    pub const fn init() -> Self {
        Self {
            id: EventId::INIT,
            param: 0,
        }
    }

    pub const fn start() -> Self {
        Self {
            id: EventId::START,
            param: 0,
        }
    }

    pub const fn finish() -> Self {
        Self {
            id: EventId::FINISH,
            param: 0,
        }
    }

    pub const fn timer_elapsed(timer: TimerId) -> Self {
        Self {
            id: EventId::timer_elapsed(timer),
            param: 0,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn param(&self) -> i32 {
        self.param
    }

    pub fn is_system(&self) -> bool {
        self.id.is_system()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.param == 0 {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}[{}]", self.id, self.param)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_band_round_trips() {
        let id = EventId::timer_elapsed(TimerId(7));
        assert_eq!(id, EventId(0x0400_0007));
        assert_eq!(id.as_timer(), Some(TimerId(7)));
        assert_eq!(EventId::timer_elapsed(TimerId(255)).as_timer(), Some(TimerId(255)));
        assert_eq!(EventId(0x0400_0100).as_timer(), None);
        assert_eq!(EventId(3).as_timer(), None);
    }

    #[test]
    fn reserved_ids_are_system_events() {
        for id in [
            EventId::INIT,
            EventId::ENTRY,
            EventId::EXIT,
            EventId::START,
            EventId::FINISH,
            EventId::timer_elapsed(TimerId(1)),
        ] {
            assert!(id.is_system(), "{id} should be a system event");
        }
        assert!(!EventId(3).is_system());
        assert!(!EventId(u32::from(b'a')).is_system());
    }

    #[test]
    fn display_names_reserved_ids() {
        assert_eq!(Event::finish().to_string(), "FINISH");
        assert_eq!(Event::timer_elapsed(TimerId(2)).to_string(), "TIMER_ELAPSED(2)");
        assert_eq!(Event::with_param(EventId(0x2a), -1).to_string(), "EVT(0x2a)[-1]");
    }
}
