mod registry;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Context, Event, Interest, Reactor};

/// Reactor recording every delivered event.
#[derive(Clone, Default)]
pub(crate) struct Collector {
    pub events: Arc<Mutex<Vec<Event>>>,
    pub interest: Option<Interest>,
}

impl Collector {
    pub fn interested_in(interest: Interest) -> Self {
        Self {
            events: Arc::default(),
            interest: Some(interest),
        }
    }

    pub fn seen(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}

impl Reactor for Collector {
    fn on_event(&mut self, _ctx: &mut Context<'_>, event: &Event) {
        self.events.lock().push(*event);
    }

    fn interest(&self) -> Interest {
        self.interest.clone().unwrap_or_default()
    }
}

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
