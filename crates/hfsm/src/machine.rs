//! Running state machine instances.

use std::sync::Arc;

use log::trace;

use crate::state::Response;
use crate::table::StateTable;
use crate::{HsmError, HsmResult, StateId};

/// Result of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<S> {
    /// Consumed by the handler of `by` without a transition.
    Handled { by: S },
    /// `source` requested a transition that settled in leaf `state`.
    Transition { source: S, state: S },
    /// No state in the active chain handled the event.
    Unhandled,
}

/// One running machine: a shared state table plus the current state.
pub struct StateMachine<S, C, E> {
    table: Arc<StateTable<S, C, E>>,
    current: S,
    started: bool,
}

impl<S: StateId, C, E> StateMachine<S, C, E> {
    pub fn new(table: Arc<StateTable<S, C, E>>) -> Self {
        let current = table.top();
        Self {
            table,
            current,
            started: false,
        }
    }

    pub fn table(&self) -> &Arc<StateTable<S, C, E>> {
        &self.table
    }

    /// Current leaf state (the top state before [`StateMachine::start`]).
    pub fn current(&self) -> S {
        self.current
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether `state` is the current state or one of its ancestors.
    pub fn is_in(&self, state: S) -> bool {
        self.table.is_ancestor_or_self(state, self.current)
    }

    /// Runs the initial transition of the top state.
    pub fn start(&mut self, ctx: &mut C) -> HsmResult<S, S> {
        if self.started {
            return Err(HsmError::AlreadyStarted);
        }
        self.current = self.table.run_init(ctx, self.table.top());
        self.started = true;
        trace!("state machine started in {:?}", self.current);
        Ok(self.current)
    }

    /// Delivers `event` to the current state, deferring to ancestors until a
    /// handler consumes it.
    pub fn dispatch(&mut self, ctx: &mut C, event: &E) -> HsmResult<Outcome<S>, S> {
        if !self.started {
            return Err(HsmError::NotStarted);
        }

        let mut state = self.current;
        loop {
            let def = self.table.state(state);
            match (def.handler)(ctx, event) {
                Response::Handled => return Ok(Outcome::Handled { by: state }),
                Response::Unhandled => match def.parent {
                    Some(parent) => state = parent,
                    None => return Ok(Outcome::Unhandled),
                },
                Response::Transition { target, action } => {
                    if !self.table.contains(target) {
                        return Err(HsmError::MissingState(target));
                    }
                    self.current =
                        self.table
                            .execute_transition(ctx, self.current, state, target, action);
                    return Ok(Outcome::Transition {
                        source: state,
                        state: self.current,
                    });
                }
            }
        }
    }
}
