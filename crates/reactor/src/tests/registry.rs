use std::sync::Arc;

use super::Collector;
use crate::{Event, EventId, EventProcessor, Interest, ProcessorId, Registry};

fn interested(
    registry: &Arc<Registry>,
    id: u32,
    ids: &[u32],
) -> EventProcessor<Collector> {
    let interest = Interest::ids(ids.iter().copied().map(EventId));
    EventProcessor::new(ProcessorId(id), registry, Collector::interested_in(interest))
}

#[test]
fn processors_register_on_build_and_unregister_on_drop() {
    let registry = Arc::new(Registry::new());
    assert!(registry.is_empty());

    let first = interested(&registry, 1, &[]);
    let second = interested(&registry, 2, &[]);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.ids(), [ProcessorId(1), ProcessorId(2)]);
    assert!(registry.contains(first.handle()));

    drop(first);
    assert_eq!(registry.ids(), [ProcessorId(2)]);
    drop(second);
    assert!(registry.is_empty());
}

#[test]
fn broadcast_reaches_only_interested_processors() {
    let registry = Arc::new(Registry::new());
    let threes = interested(&registry, 1, &[3]);
    let sevens = interested(&registry, 2, &[7]);

    assert_eq!(registry.broadcast(Event::new(EventId(3))), 1);
    assert_eq!(threes.pending(), 1);
    assert_eq!(sevens.pending(), 0);

    assert_eq!(registry.broadcast(Event::new(EventId(9))), 0);

    assert_eq!(registry.broadcast(Event::start()), 2);
    assert_eq!(threes.pending(), 2);
    assert_eq!(sevens.pending(), 1);
}

#[test]
fn broadcast_without_processors_delivers_nothing() {
    let registry = Registry::new();
    assert_eq!(registry.broadcast(Event::finish()), 0);
}

#[test]
#[should_panic(expected = "registered twice")]
fn duplicate_registration_is_fatal() {
    let registry = Arc::new(Registry::new());
    let processor = interested(&registry, 1, &[]);
    registry.register(processor.handle().clone());
}

#[test]
#[should_panic(expected = "never registered")]
fn unregistering_an_unknown_processor_is_fatal() {
    let registry = Arc::new(Registry::new());
    let other = Registry::new();
    let processor = interested(&registry, 1, &[]);
    other.unregister(processor.handle());
}
