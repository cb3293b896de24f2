//! # hfsm
//!
//! Hierarchical state machine engine implementing UML statechart transition
//! semantics on top of a static state table.
//!
//! - [`state`]      – State definitions, handler responses and actions.
//! - [`table`]      – Validated state tree with memoized ancestor chains.
//! - [`transition`] – Exit/entry/init sequencing between two states.
//! - [`machine`]    – A running machine instance holding the current state.
//!
//! States are identified by a small `Copy` id (usually a fieldless enum). The
//! table is built once, shared behind an `Arc` by every machine of that type,
//! and never mutated; only the current state of a [`StateMachine`] changes.

use core::fmt;
use core::hash::Hash;

use thiserror::Error;

pub mod machine;
pub mod state;
pub mod table;
pub mod transition;

pub use machine::{Outcome, StateMachine};
pub use state::{handled, transition, transition_with, unhandled, Action, Handler, Response, State};
pub use table::{StateTable, TableBuilder};
pub use transition::TransitionPath;

#[cfg(test)]
mod tests;

/// Identifier of a state within a [`StateTable`].
pub trait StateId: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> StateId for T where T: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// Errors raised while building a state table or driving a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HsmError<S> {
    #[error("state {0:?} is defined more than once")]
    DuplicateState(S),
    #[error("state {state:?} names parent {parent:?} which is not in the table")]
    MissingParent { state: S, parent: S },
    #[error("state {0:?} is not in the table")]
    MissingState(S),
    #[error("states {0:?} and {1:?} both have no parent")]
    MultipleTops(S, S),
    #[error("table has no top state")]
    NoTop,
    #[error("parent chain of state {0:?} does not reach the top state")]
    Cycle(S),
    #[error("initial state {child:?} of {state:?} is not one of its direct children")]
    InvalidInitial { state: S, child: S },
    #[error("state machine was not started")]
    NotStarted,
    #[error("state machine is already started")]
    AlreadyStarted,
}

/// Result type used throughout the engine.
pub type HsmResult<T, S> = Result<T, HsmError<S>>;
