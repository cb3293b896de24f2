use super::{sample_table, Id, Probe, Sig};
use crate::{HsmError, State, StateTable, TransitionPath};

type Def = State<Id, Probe, Sig>;

#[test]
fn chains_run_from_state_to_top() {
    let table = sample_table();
    assert_eq!(table.top(), Id::Top);
    assert_eq!(
        table.chain(Id::S211),
        &[Id::S211, Id::S21, Id::S2, Id::S0, Id::Top]
    );
    assert_eq!(table.depth(Id::S211), 4);
    assert_eq!(table.depth(Id::Top), 0);
    assert!(table.is_ancestor_or_self(Id::S0, Id::S11));
    assert!(table.is_ancestor_or_self(Id::S11, Id::S11));
    assert!(!table.is_ancestor_or_self(Id::S1, Id::S21));
}

#[test]
fn plan_for_lca_scenario() {
    let table = sample_table();
    assert_eq!(
        table.plan_transition(Id::S11, Id::S11, Id::S211),
        TransitionPath {
            exits: vec![Id::S11, Id::S1],
            entries: vec![Id::S2, Id::S21, Id::S211],
        }
    );
}

#[test]
fn plan_for_leaf_self_transition() {
    let table = sample_table();
    assert_eq!(
        table.plan_transition(Id::S11, Id::S11, Id::S11),
        TransitionPath {
            exits: vec![Id::S11],
            entries: vec![Id::S11],
        }
    );
}

#[test]
fn leaf_self_transition_runs_exit_entry_init() {
    let table = sample_table();
    let mut probe = Probe::default();

    let leaf = table.execute_transition(&mut probe, Id::S11, Id::S11, Id::S11, None);

    assert_eq!(leaf, Id::S11);
    assert_eq!(probe.log, ["s11-EXIT", "s11-ENTRY"]);
}

#[test]
fn plan_for_transition_to_top() {
    let table = sample_table();
    let path = table.plan_transition(Id::S211, Id::S211, Id::Top);
    assert_eq!(
        path.exits,
        vec![Id::S211, Id::S21, Id::S2, Id::S0, Id::Top]
    );
    assert_eq!(path.entries, vec![Id::Top]);
}

#[test]
fn duplicate_state_is_rejected() {
    let result = StateTable::builder()
        .state(Id::Top, Def::new())
        .state(Id::S0, Def::new().parent(Id::Top))
        .state(Id::S0, Def::new().parent(Id::Top))
        .build();
    assert_eq!(result.err(), Some(HsmError::DuplicateState(Id::S0)));
}

#[test]
fn missing_parent_is_rejected() {
    let result = StateTable::builder()
        .state(Id::Top, Def::new())
        .state(Id::S11, Def::new().parent(Id::S1))
        .build();
    assert_eq!(
        result.err(),
        Some(HsmError::MissingParent {
            state: Id::S11,
            parent: Id::S1
        })
    );
}

#[test]
fn second_top_is_rejected() {
    let result = StateTable::builder()
        .state(Id::Top, Def::new())
        .state(Id::S0, Def::new())
        .build();
    assert_eq!(result.err(), Some(HsmError::MultipleTops(Id::Top, Id::S0)));
}

#[test]
fn empty_table_has_no_top() {
    let result = StateTable::<Id, Probe, Sig>::builder().build();
    assert_eq!(result.err(), Some(HsmError::NoTop));
}

#[test]
fn parent_cycle_is_rejected() {
    let result = StateTable::builder()
        .state(Id::Top, Def::new())
        .state(Id::S1, Def::new().parent(Id::S2))
        .state(Id::S2, Def::new().parent(Id::S1))
        .build();
    assert!(matches!(result.err(), Some(HsmError::Cycle(_))));
}

#[test]
fn initial_must_be_direct_child() {
    let result = StateTable::builder()
        .state(Id::Top, Def::new().init(Id::S1))
        .state(Id::S0, Def::new().parent(Id::Top))
        .state(Id::S1, Def::new().parent(Id::S0))
        .build();
    assert_eq!(
        result.err(),
        Some(HsmError::InvalidInitial {
            state: Id::Top,
            child: Id::S1
        })
    );
}
