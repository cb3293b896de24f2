//! State definitions and handler return values.

use core::fmt;

/// Entry, exit, init or transition action run against the machine's
/// instance data.
pub type Action<C> = fn(&mut C);

/// Event handler of a single state.
///
/// Returning [`Response::Unhandled`] defers the event to the parent state.
pub type Handler<S, C, E> = fn(&mut C, &E) -> Response<S, C>;

/// What a state handler decided to do with an event.
pub enum Response<S, C> {
    /// Event was consumed by this state.
    Handled,
    /// Event is not handled here, try the parent state.
    Unhandled,
    /// Transition to `target`, running `action` between the exit and the
    /// entry phase.
    Transition { target: S, action: Option<Action<C>> },
}

impl<S, C> Response<S, C> {
    /// Check if the event was consumed (handled or caused a transition).
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Unhandled)
    }

    /// Check if this is a transition.
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }
}

impl<S: Clone, C> Clone for Response<S, C> {
    fn clone(&self) -> Self {
        match self {
            Self::Handled => Self::Handled,
            Self::Unhandled => Self::Unhandled,
            Self::Transition { target, action } => Self::Transition {
                target: target.clone(),
                action: *action,
            },
        }
    }
}

impl<S: Copy, C> Copy for Response<S, C> {}

impl<S: fmt::Debug, C> fmt::Debug for Response<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handled => write!(f, "Handled"),
            Self::Unhandled => write!(f, "Unhandled"),
            Self::Transition { target, action } => f
                .debug_struct("Transition")
                .field("target", target)
                .field("has_action", &action.is_some())
                .finish(),
        }
    }
}

/// Convenient return value for a consumed event.
pub const fn handled<S, C>() -> Response<S, C> {
    Response::Handled
}

/// Convenient return value deferring to the parent state.
pub const fn unhandled<S, C>() -> Response<S, C> {
    Response::Unhandled
}

/// Create a transition return value.
pub const fn transition<S, C>(target: S) -> Response<S, C> {
    Response::Transition {
        target,
        action: None,
    }
}

/// Create a transition return value with a transition action.
pub const fn transition_with<S, C>(target: S, action: Action<C>) -> Response<S, C> {
    Response::Transition {
        target,
        action: Some(action),
    }
}

fn defer<S, C, E>(_: &mut C, _: &E) -> Response<S, C> {
    Response::Unhandled
}

/// Static description of one node of the state tree.
///
/// A state with an initial child is composite; a state without one is a leaf
/// and becomes the current state when a transition reaches it.
pub struct State<S, C, E> {
    pub(crate) parent: Option<S>,
    pub(crate) entry: Option<Action<C>>,
    pub(crate) exit: Option<Action<C>>,
    pub(crate) init: Option<Action<C>>,
    pub(crate) initial: Option<S>,
    pub(crate) handler: Handler<S, C, E>,
}

impl<S, C, E> State<S, C, E> {
    /// A top-level state with no actions whose handler defers everything.
    pub fn new() -> Self {
        Self {
            parent: None,
            entry: None,
            exit: None,
            init: None,
            initial: None,
            handler: defer::<S, C, E>,
        }
    }

    /// Sets the parent state.
    pub fn parent(mut self, parent: S) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the event handler.
    pub fn handler(mut self, handler: Handler<S, C, E>) -> Self {
        self.handler = handler;
        self
    }

    /// Sets the entry action.
    pub fn entry(mut self, action: Action<C>) -> Self {
        self.entry = Some(action);
        self
    }

    /// Sets the exit action.
    pub fn exit(mut self, action: Action<C>) -> Self {
        self.exit = Some(action);
        self
    }

    /// Makes the state composite with `child` as its default sub-state.
    pub fn init(mut self, child: S) -> Self {
        self.initial = Some(child);
        self
    }

    /// Like [`State::init`], also running `action` before `child` is entered.
    pub fn init_with(mut self, child: S, action: Action<C>) -> Self {
        self.initial = Some(child);
        self.init = Some(action);
        self
    }

    pub fn parent_state(&self) -> Option<&S> {
        self.parent.as_ref()
    }

    pub fn initial_state(&self) -> Option<&S> {
        self.initial.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.initial.is_none()
    }
}

impl<S, C, E> Default for State<S, C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug, C, E> fmt::Debug for State<S, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("parent", &self.parent)
            .field("initial", &self.initial)
            .field("has_entry", &self.entry.is_some())
            .field("has_exit", &self.exit.is_some())
            .field("has_init", &self.init.is_some())
            .finish()
    }
}
