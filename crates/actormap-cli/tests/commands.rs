//! Subcommands against documents and configs on disk.

use actormap_cli::commands;
use actormap_core::{CoordinatorConfig, Document};
use actormap_model::{Graph, StateId};
use actormap_test_utils::{actor, sample_document};
use actormap_timeline::{OrphanPolicy, State, Timeline};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn document_with_orphan() -> Document {
    let root = State::new("Root", None, Graph::new());
    let orphan = State::new("Stray", Some(StateId::from("gone")), Graph::new());
    let root_id = root.id.clone();
    let timeline = Timeline::from_parts(vec![root, orphan], root_id.clone(), root_id).unwrap();
    Document::new("Orphans").with_timeline(timeline)
}

#[test]
fn inspect_marks_the_current_state() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.json", &sample_document(3).to_json_pretty().unwrap());

    let document = commands::load_document(&path).unwrap();
    let out = commands::inspect(&document);

    assert!(out.starts_with("Sample ("));
    assert!(out.contains("timeline: 1 state(s)"));
    assert!(out.contains("Initial State *  [3 actors, 0 relations]"));
    assert!(!out.contains("orphaned:"));
}

#[test]
fn inspect_lists_orphans_separately() {
    let out = commands::inspect(&document_with_orphan());
    let (tree, orphans) = out.split_once("orphaned:\n").unwrap();
    assert!(tree.contains("Root *"));
    assert!(orphans.contains("Stray"));
}

#[test]
fn inspect_without_timeline() {
    let out = commands::inspect(&Document::new("Blank"));
    assert!(out.contains("timeline: not initialized"));
}

#[test]
fn load_document_reports_the_path_on_bad_json() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.json", "{ not json");
    let err = commands::load_document(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));
}

#[test]
fn valid_document_has_no_problems() {
    let problems = commands::validate(&sample_document(2), &CoordinatorConfig::default());
    assert!(problems.is_empty(), "{problems:?}");
}

#[test]
fn dangling_group_reference_is_a_problem() {
    let graph = Graph::with_nodes(vec![actor("x").in_group("ghost")]);
    let document = Document::new("Ghost").with_timeline(Timeline::new(graph));

    let problems = commands::validate(&document, &CoordinatorConfig::default());

    assert_eq!(problems.len(), 1);
    assert!(problems[0].starts_with("state Initial State ("));
}

#[test]
fn orphans_only_count_when_reparenting() {
    let document = document_with_orphan();

    let reparent = commands::validate(&document, &CoordinatorConfig::default());
    let retain = commands::validate(
        &document,
        &CoordinatorConfig::default().with_orphan_policy(OrphanPolicy::Retain),
    );

    assert_eq!(reparent.len(), 1);
    assert!(retain.is_empty(), "{retain:?}");
}

#[test]
fn config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "actormap.toml",
        "orphan_policy = \"retain\"\npersist_debounce_ms = 250\n\n[history]\nmax_undo = 10\n",
    );

    let config = commands::load_config(Some(&path)).unwrap();

    assert_eq!(config.orphan_policy, OrphanPolicy::Retain);
    assert_eq!(config.persist_debounce_ms, 250);
    assert_eq!(config.history.max_undo, 10);
    assert_eq!(config.history.max_redo, CoordinatorConfig::default().history.max_redo);
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "actormap.toml", "undo_depth = 5\n");
    assert!(commands::load_config(Some(&path)).is_err());
}

#[test]
fn missing_config_path_means_defaults() {
    assert_eq!(commands::load_config(None).unwrap(), CoordinatorConfig::default());
}

#[tokio::test]
async fn demo_branches_edits_and_undoes() {
    let config = CoordinatorConfig::default().with_persist_debounce_ms(0);
    let steps = commands::run_demo(config).await.unwrap();

    let actions: Vec<&str> = steps.iter().map(|s| s.action.as_str()).collect();
    assert_eq!(actions, ["initialize", "create state Q2", "add actor", "undo", "redo"]);

    let actors: Vec<usize> = steps.iter().map(|s| s.actors).collect();
    assert_eq!(actors, [2, 2, 3, 2, 3]);

    let states: Vec<&str> = steps.iter().map(|s| s.current_state.as_str()).collect();
    assert_eq!(states, ["Initial State", "Q2", "Q2", "Q2", "Q2"]);

    assert!(steps[3].can_redo);
    assert!(steps[4].can_undo);
    assert!(!steps[4].can_redo);
    assert_ne!(steps[2].fingerprint, steps[3].fingerprint);

    let rendered = commands::render_steps(&steps);
    assert_eq!(rendered.lines().count(), 5);
}
