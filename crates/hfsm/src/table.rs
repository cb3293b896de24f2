//! Static state tree with memoized ancestor chains.

use std::collections::HashMap;

use log::debug;

use crate::state::State;
use crate::{HsmError, HsmResult, StateId};

/// Validated, immutable state tree shared by all machines of one type.
pub struct StateTable<S, C, E> {
    top: S,
    states: HashMap<S, State<S, C, E>>,
    /// Ancestor chain of every state, starting with the state itself and
    /// ending with the top state.
    chains: HashMap<S, Vec<S>>,
}

/// Collects state definitions and validates them into a [`StateTable`].
pub struct TableBuilder<S, C, E> {
    states: Vec<(S, State<S, C, E>)>,
}

impl<S: StateId, C, E> Default for TableBuilder<S, C, E> {
    fn default() -> Self {
        Self { states: Vec::new() }
    }
}

impl<S: StateId, C, E> TableBuilder<S, C, E> {
    /// Adds a state definition.
    pub fn state(mut self, id: S, state: State<S, C, E>) -> Self {
        self.states.push((id, state));
        self
    }

    /// Validates the tree and computes every ancestor chain.
    pub fn build(self) -> HsmResult<StateTable<S, C, E>, S> {
        let mut states = HashMap::with_capacity(self.states.len());
        let mut top = None;

        for (id, state) in self.states {
            if state.parent.is_none() {
                if let Some(existing) = top {
                    if existing != id {
                        return Err(HsmError::MultipleTops(existing, id));
                    }
                }
                top = Some(id);
            }
            if states.insert(id, state).is_some() {
                return Err(HsmError::DuplicateState(id));
            }
        }

        let top = top.ok_or(HsmError::NoTop)?;

        for (id, state) in &states {
            if let Some(parent) = state.parent {
                if !states.contains_key(&parent) {
                    return Err(HsmError::MissingParent { state: *id, parent });
                }
            }
        }

        let mut chains = HashMap::with_capacity(states.len());
        for id in states.keys() {
            let mut chain = vec![*id];
            let mut current = *id;
            while let Some(parent) = states[&current].parent {
                if chain.len() > states.len() {
                    return Err(HsmError::Cycle(*id));
                }
                chain.push(parent);
                current = parent;
            }
            if current != top {
                return Err(HsmError::Cycle(*id));
            }
            chains.insert(*id, chain);
        }

        for (id, state) in &states {
            if let Some(child) = state.initial {
                let valid = states.get(&child).and_then(|c| c.parent) == Some(*id);
                if !valid {
                    return Err(HsmError::InvalidInitial { state: *id, child });
                }
            }
        }

        debug!("state table built: {} states, top {:?}", states.len(), top);

        Ok(StateTable {
            top,
            states,
            chains,
        })
    }
}

impl<S: StateId, C, E> StateTable<S, C, E> {
    pub fn builder() -> TableBuilder<S, C, E> {
        TableBuilder::default()
    }

    /// The root of the tree.
    pub fn top(&self) -> S {
        self.top
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, id: S) -> bool {
        self.states.contains_key(&id)
    }

    pub fn get(&self, id: S) -> Option<&State<S, C, E>> {
        self.states.get(&id)
    }

    pub fn parent(&self, id: S) -> Option<S> {
        self.states.get(&id).and_then(|state| state.parent)
    }

    /// Ancestor chain of `id`, from `id` itself up to the top state.
    pub fn chain(&self, id: S) -> &[S] {
        self.chains.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nesting depth; the top state has depth zero.
    pub fn depth(&self, id: S) -> usize {
        self.chain(id).len().saturating_sub(1)
    }

    /// Whether `ancestor` equals `state` or encloses it.
    pub fn is_ancestor_or_self(&self, ancestor: S, state: S) -> bool {
        self.chain(state).contains(&ancestor)
    }

    /// Ancestry test that treats `None` as the implicit root above the top
    /// state, which encloses everything.
    pub(crate) fn encloses(&self, ancestor: Option<S>, state: Option<S>) -> bool {
        match (ancestor, state) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(s)) => self.is_ancestor_or_self(a, s),
        }
    }

    /// Definition of a state known to be in the table.
    pub(crate) fn state(&self, id: S) -> &State<S, C, E> {
        &self.states[&id]
    }
}
