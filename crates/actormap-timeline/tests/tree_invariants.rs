//! Tree invariants under arbitrary operation sequences.
//!
//! Whatever order create / switch / duplicate / delete are issued in, the
//! timeline must keep exactly one root, a valid current pointer and an
//! acyclic parent structure. Refused operations must leave it untouched.

use actormap_model::{Graph, Node, StateId};
use actormap_timeline::{DeleteMode, OrphanPolicy, Timeline, TimelineError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create,
    Switch(usize),
    Duplicate(usize),
    DuplicateAsChild(usize),
    Delete(usize, bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Create),
        any::<usize>().prop_map(Op::Switch),
        any::<usize>().prop_map(Op::Duplicate),
        any::<usize>().prop_map(Op::DuplicateAsChild),
        (any::<usize>(), any::<bool>()).prop_map(|(i, c)| Op::Delete(i, c)),
    ]
}

fn pick(timeline: &Timeline, idx: usize) -> StateId {
    let ids: Vec<&StateId> = timeline.states().keys().collect();
    ids[idx % ids.len()].clone()
}

fn live(step: usize) -> Graph {
    Graph::with_nodes(vec![Node::new(format!("n{step}"), "Actor", "actor")])
}

fn run(ops: &[Op], policy: OrphanPolicy) -> Timeline {
    let mut timeline = Timeline::new(live(0));
    let root = timeline.root_state_id().clone();

    for (step, op) in ops.iter().enumerate() {
        let before = timeline.clone();
        let result: Result<(), TimelineError> = match op {
            Op::Create => {
                timeline.create_state(format!("s{step}"), None, live(step));
                Ok(())
            }
            Op::Switch(i) => {
                let id = pick(&timeline, *i);
                timeline.switch_to_state(&id, &live(step)).map(|_| ())
            }
            Op::Duplicate(i) => {
                let id = pick(&timeline, *i);
                timeline.duplicate_state(&id, None).map(|_| ())
            }
            Op::DuplicateAsChild(i) => {
                let id = pick(&timeline, *i);
                timeline.duplicate_state_as_child(&id, None).map(|_| ())
            }
            Op::Delete(i, confirmed) => {
                let id = pick(&timeline, *i);
                let mode = if *confirmed {
                    DeleteMode::Confirmed
                } else {
                    DeleteMode::Guarded
                };
                timeline.delete_state(&id, mode, policy).map(|_| ())
            }
        };

        if result.is_err() {
            assert_eq!(timeline, before, "refused {op:?} mutated the timeline");
        }
        assert_eq!(timeline.root_state_id(), &root);
    }
    timeline
}

proptest! {
    #[test]
    fn reparenting_keeps_a_valid_tree(ops in prop::collection::vec(op(), 0..60)) {
        let timeline = run(&ops, OrphanPolicy::ReparentToGrandparent);
        prop_assert!(timeline.validate().is_empty(), "{:?}", timeline.validate());
        prop_assert!(timeline.orphaned_states().is_empty());
        prop_assert!(timeline.root_state().parent_state_id.is_none());
    }

    #[test]
    fn retaining_orphans_stays_navigable(ops in prop::collection::vec(op(), 0..60)) {
        let timeline = run(&ops, OrphanPolicy::Retain);
        prop_assert!(timeline.validate().iter().all(|v| !v.is_fatal()));
        prop_assert!(timeline.contains(timeline.current_state_id()));
    }

    #[test]
    fn every_state_reaches_the_root(ops in prop::collection::vec(op(), 0..60)) {
        let timeline = run(&ops, OrphanPolicy::ReparentToGrandparent);
        for state in timeline.get_all_states() {
            let path = timeline.ancestors(&state.id);
            let top = path.last().expect("path includes the state itself");
            prop_assert_eq!(&top.id, timeline.root_state_id());
        }
    }
}

#[test]
fn deleting_a_branch_point_reparents_every_child() {
    let mut timeline = Timeline::new(live(0));
    let root = timeline.root_state_id().clone();
    let hub = timeline.create_state("hub", None, live(1));
    let a = timeline.create_state("a", None, live(2));
    timeline.switch_to_state(&hub, &live(2)).unwrap();
    let b = timeline.create_state("b", None, live(3));
    timeline.switch_to_state(&root, &live(3)).unwrap();

    let deleted = timeline
        .delete_state(&hub, DeleteMode::Confirmed, OrphanPolicy::ReparentToGrandparent)
        .unwrap();

    assert_eq!(deleted.reparented.len(), 2);
    let children: Vec<&StateId> = timeline
        .get_child_states(&root)
        .into_iter()
        .map(|s| &s.id)
        .collect();
    assert!(children.contains(&&a));
    assert!(children.contains(&&b));
}
