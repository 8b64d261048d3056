//! Observers of the live store never see a torn document.
//!
//! Every notification during undo, redo, state switches and document
//! activation must carry a graph without dangling group or edge references
//! and a timeline whose current pointer resolves.

use actormap_core::{CoordinatorConfig, DocumentCoordinator, InMemoryLiveStore, LiveView};
use actormap_model::{Graph, Group, GroupId};
use actormap_test_utils::{actor, relation, sample_document};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

fn watch(live: &InMemoryLiveStore) -> Arc<Mutex<Vec<String>>> {
    let problems = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&problems);
    live.subscribe(move |view: &LiveView| {
        let dangling = view.graph.dangling_references();
        if !dangling.is_empty() {
            sink.lock().push(format!("rev {}: {dangling:?}", view.revision));
        }
        if let Some(timeline) = &view.timeline {
            if !timeline.contains(timeline.current_state_id()) {
                sink.lock().push(format!("rev {}: current state missing", view.revision));
            }
        }
    });
    problems
}

fn add_grouped_actor(graph: &mut Graph, group: &str, id: &str) {
    if graph.group(&GroupId::from(group)).is_none() {
        let _ = graph.add_group(Group::new(group, group));
    }
    let _ = graph.add_node(actor(id).in_group(group));
}

#[test]
fn undo_across_group_removal_is_atomic() {
    let live = InMemoryLiveStore::shared();
    let problems = watch(&live);
    let mut coordinator = DocumentCoordinator::new(CoordinatorConfig::default(), live.clone());
    coordinator.open_document(sample_document(0)).unwrap();

    coordinator
        .mutate_graph("Group Actors", |g| {
            add_grouped_actor(g, "board", "a");
            add_grouped_actor(g, "board", "b");
            g.add_edge(relation("e", "a", "b"))
        })
        .unwrap()
        .unwrap();
    let q2 = coordinator.create_state("Q2", None, true).unwrap();
    coordinator
        .mutate_graph("Ungroup", |g| g.remove_group(&GroupId::from("board")))
        .unwrap();
    coordinator
        .mutate_graph("Remove Actor", |g| g.remove_node(&"a".into()))
        .unwrap();
    let root = coordinator.timeline().unwrap().root_state_id().clone();
    coordinator.switch_to_state(&root).unwrap();

    while coordinator.undo().is_ok() {}
    while coordinator.redo().is_ok() {}
    coordinator.switch_to_state(&q2).unwrap();

    assert!(problems.lock().is_empty(), "{:?}", problems.lock());
    assert!(live.view().graph.group(&GroupId::from("board")).is_none());
}

#[derive(Debug, Clone)]
enum Action {
    AddGrouped(u8, u8),
    RemoveGroup(u8),
    RemoveActor(u8),
    Branch,
    SwitchToRoot,
    Undo,
    Redo,
    SwapDocument,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => (0u8..3, 0u8..8).prop_map(|(g, n)| Action::AddGrouped(g, n)),
        1 => (0u8..3).prop_map(Action::RemoveGroup),
        1 => (0u8..8).prop_map(Action::RemoveActor),
        1 => Just(Action::Branch),
        1 => Just(Action::SwitchToRoot),
        2 => Just(Action::Undo),
        2 => Just(Action::Redo),
        1 => Just(Action::SwapDocument),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn observers_never_see_dangling_references(actions in prop::collection::vec(action(), 1..40)) {
        let live = InMemoryLiveStore::shared();
        let problems = watch(&live);
        let mut coordinator = DocumentCoordinator::new(CoordinatorConfig::default(), live.clone());
        let first = coordinator.open_document(sample_document(1)).unwrap();
        let second = coordinator.open_document(sample_document(2)).unwrap();

        for action in actions {
            match action {
                Action::AddGrouped(g, n) => {
                    coordinator
                        .mutate_graph("Add Actor", |graph| {
                            add_grouped_actor(graph, &format!("g{g}"), &format!("n{n}"));
                        })
                        .unwrap();
                }
                Action::RemoveGroup(g) => {
                    coordinator
                        .mutate_graph("Remove Group", |graph| graph.remove_group(&GroupId::from(format!("g{g}"))))
                        .unwrap();
                }
                Action::RemoveActor(n) => {
                    coordinator
                        .mutate_graph("Remove Actor", |graph| graph.remove_node(&format!("n{n}").into()))
                        .unwrap();
                }
                Action::Branch => {
                    coordinator.create_state("Branch", None, true).unwrap();
                }
                Action::SwitchToRoot => {
                    let root = coordinator.timeline().unwrap().root_state_id().clone();
                    coordinator.switch_to_state(&root).unwrap();
                }
                Action::Undo => {
                    let _ = coordinator.undo();
                }
                Action::Redo => {
                    let _ = coordinator.redo();
                }
                Action::SwapDocument => {
                    let next = if coordinator.active_document_id() == Some(&first) {
                        second.clone()
                    } else {
                        first.clone()
                    };
                    coordinator.activate_document(&next).unwrap();
                }
            }
        }

        let problems = problems.lock();
        prop_assert!(problems.is_empty(), "{:?}", *problems);
    }
}
