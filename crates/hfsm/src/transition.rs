//! Transition sequencing.
//!
//! A transition is described by the current (leaf) state `C`, the source `S`
//! whose handler requested it (`C` itself or one of its ancestors) and the
//! target `T`. Sequencing works purely on the parent relation:
//!
//! - exit: walk up from `C`, exiting each state `x`, and stop after the first
//!   `x` that encloses `S` and whose parent encloses the parent of `T`;
//! - entry: walk up from `T` collecting states to enter; stop after a state
//!   `y` that encloses `S`, or whose parent encloses `S` while `y` itself does
//!   not lie inside `S`. Entries then run root-to-leaf;
//! - init: run the init sequence of `T` until a leaf is reached.
//!
//! A self-transition (`S == T`) therefore exits and re-enters `S`.

use log::trace;

use crate::state::Action;
use crate::table::StateTable;
use crate::StateId;

/// Exit and entry sequences computed for one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPath<S> {
    /// States to exit, innermost first.
    pub exits: Vec<S>,
    /// States to enter, outermost first. Always ends with the target.
    pub entries: Vec<S>,
}

impl<S: StateId, C, E> StateTable<S, C, E> {
    /// Computes the exit and entry sequences for a transition from `current`
    /// requested by `source` towards `target`.
    pub fn plan_transition(&self, current: S, source: S, target: S) -> TransitionPath<S> {
        let target_parent = self.parent(target);

        let mut exits = Vec::new();
        let mut state = Some(current);
        while let Some(exiting) = state {
            exits.push(exiting);
            let parent = self.parent(exiting);
            if self.encloses(parent, target_parent) && self.is_ancestor_or_self(exiting, source) {
                break;
            }
            state = parent;
        }

        let mut entries = Vec::new();
        let mut state = Some(target);
        while let Some(entering) = state {
            entries.push(entering);
            let parent = self.parent(entering);
            let stop = self.is_ancestor_or_self(entering, source)
                || (self.encloses(parent, Some(source))
                    && !self.is_ancestor_or_self(source, entering));
            if stop {
                break;
            }
            state = parent;
        }
        entries.reverse();

        TransitionPath { exits, entries }
    }

    /// Runs a full transition against `ctx` and returns the new leaf state.
    pub fn execute_transition(
        &self,
        ctx: &mut C,
        current: S,
        source: S,
        target: S,
        action: Option<Action<C>>,
    ) -> S {
        let path = self.plan_transition(current, source, target);
        trace!(
            "transition {:?} -> {:?} (source {:?}): exit {:?}, enter {:?}",
            current,
            target,
            source,
            path.exits,
            path.entries
        );

        for state in &path.exits {
            if let Some(exit) = self.state(*state).exit {
                exit(ctx);
            }
        }
        if let Some(action) = action {
            action(ctx);
        }
        for state in &path.entries {
            if let Some(entry) = self.state(*state).entry {
                entry(ctx);
            }
        }
        self.run_init(ctx, target)
    }

    /// Runs the init sequence of `state`: its init action, then entry and
    /// init of its default child, down to a leaf which is returned.
    pub fn run_init(&self, ctx: &mut C, state: S) -> S {
        let mut state = state;
        loop {
            let def = self.state(state);
            if let Some(init) = def.init {
                init(ctx);
            }
            match def.initial {
                Some(child) => {
                    if let Some(entry) = self.state(child).entry {
                        entry(ctx);
                    }
                    state = child;
                }
                None => return state,
            }
        }
    }
}
