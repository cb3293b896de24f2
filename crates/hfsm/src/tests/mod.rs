mod table;

use std::sync::Arc;

use crate::{
    handled, transition, transition_with, unhandled, Response, State, StateTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Id {
    Top,
    S0,
    S1,
    S11,
    S2,
    S21,
    S211,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sig {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

#[derive(Debug, Default)]
pub(crate) struct Probe {
    pub log: Vec<&'static str>,
    pub foo: bool,
}

impl Probe {
    pub fn take(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.log)
    }
}

fn s0(_: &mut Probe, sig: &Sig) -> Response<Id, Probe> {
    match sig {
        Sig::E => transition_with(Id::S211, |p: &mut Probe| p.log.push("s0-E")),
        _ => unhandled(),
    }
}

fn s1(_: &mut Probe, sig: &Sig) -> Response<Id, Probe> {
    match sig {
        Sig::A => transition_with(Id::S1, |p: &mut Probe| p.log.push("s1-A")),
        Sig::B => transition_with(Id::S11, |p: &mut Probe| p.log.push("s1-B")),
        Sig::C => transition_with(Id::S2, |p: &mut Probe| p.log.push("s1-C")),
        Sig::D => transition_with(Id::S0, |p: &mut Probe| p.log.push("s1-D")),
        Sig::F => transition_with(Id::S211, |p: &mut Probe| p.log.push("s1-F")),
        _ => unhandled(),
    }
}

fn s11(p: &mut Probe, sig: &Sig) -> Response<Id, Probe> {
    match sig {
        Sig::G => transition_with(Id::S211, |p: &mut Probe| p.log.push("s11-G")),
        Sig::H if p.foo => {
            p.log.push("s11-H");
            p.foo = false;
            handled()
        }
        _ => unhandled(),
    }
}

fn s2(_: &mut Probe, sig: &Sig) -> Response<Id, Probe> {
    match sig {
        Sig::C => transition_with(Id::S1, |p: &mut Probe| p.log.push("s2-C")),
        Sig::F => transition_with(Id::S11, |p: &mut Probe| p.log.push("s2-F")),
        _ => unhandled(),
    }
}

fn s21(p: &mut Probe, sig: &Sig) -> Response<Id, Probe> {
    match sig {
        Sig::B => transition_with(Id::S211, |p: &mut Probe| p.log.push("s21-B")),
        Sig::H if !p.foo => transition_with(Id::S21, |p: &mut Probe| {
            p.log.push("s21-H");
            p.foo = true;
        }),
        _ => unhandled(),
    }
}

fn s211(_: &mut Probe, sig: &Sig) -> Response<Id, Probe> {
    match sig {
        Sig::D => transition(Id::S21),
        Sig::G => transition(Id::S0),
        _ => unhandled(),
    }
}

/// Top → S0 → {S1 → S11, S2 → S21 → S211}, default children S0, S1, S11,
/// S21, S211.
pub(crate) fn sample_table() -> Arc<StateTable<Id, Probe, Sig>> {
    let table = StateTable::builder()
        .state(
            Id::Top,
            State::new()
                .entry(|p: &mut Probe| p.log.push("top-ENTRY"))
                .exit(|p: &mut Probe| p.log.push("top-EXIT"))
                .init_with(Id::S0, |p: &mut Probe| p.log.push("top-INIT")),
        )
        .state(
            Id::S0,
            State::new()
                .parent(Id::Top)
                .handler(s0)
                .entry(|p: &mut Probe| p.log.push("s0-ENTRY"))
                .exit(|p: &mut Probe| p.log.push("s0-EXIT"))
                .init_with(Id::S1, |p: &mut Probe| p.log.push("s0-INIT")),
        )
        .state(
            Id::S1,
            State::new()
                .parent(Id::S0)
                .handler(s1)
                .entry(|p: &mut Probe| p.log.push("s1-ENTRY"))
                .exit(|p: &mut Probe| p.log.push("s1-EXIT"))
                .init_with(Id::S11, |p: &mut Probe| p.log.push("s1-INIT")),
        )
        .state(
            Id::S11,
            State::new()
                .parent(Id::S1)
                .handler(s11)
                .entry(|p: &mut Probe| p.log.push("s11-ENTRY"))
                .exit(|p: &mut Probe| p.log.push("s11-EXIT")),
        )
        .state(
            Id::S2,
            State::new()
                .parent(Id::S0)
                .handler(s2)
                .entry(|p: &mut Probe| p.log.push("s2-ENTRY"))
                .exit(|p: &mut Probe| p.log.push("s2-EXIT"))
                .init_with(Id::S21, |p: &mut Probe| p.log.push("s2-INIT")),
        )
        .state(
            Id::S21,
            State::new()
                .parent(Id::S2)
                .handler(s21)
                .entry(|p: &mut Probe| p.log.push("s21-ENTRY"))
                .exit(|p: &mut Probe| p.log.push("s21-EXIT"))
                .init_with(Id::S211, |p: &mut Probe| p.log.push("s21-INIT")),
        )
        .state(
            Id::S211,
            State::new()
                .parent(Id::S21)
                .handler(s211)
                .entry(|p: &mut Probe| p.log.push("s211-ENTRY"))
                .exit(|p: &mut Probe| p.log.push("s211-EXIT")),
        )
        .build()
        .expect("sample table is valid");
    Arc::new(table)
}
