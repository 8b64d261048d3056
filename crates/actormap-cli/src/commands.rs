//! Subcommand implementations.
//!
//! Each command returns its output as data; `main` decides how to print it.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use actormap_core::{
    CoordinatorConfig, DebouncedPersist, Document, DocumentCoordinator, InMemoryLiveStore, LiveStore, PersistSink,
};
use actormap_history::capture;
use actormap_model::{DocumentId, Graph, Node};
use actormap_timeline::{OrphanPolicy, State, Timeline};
use anyhow::Context;
use serde::Serialize;
use tracing::info;

/// Read a persisted document from disk
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn load_document(path: &Path) -> anyhow::Result<Document> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Document::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

/// Coordinator configuration from an optional TOML file
///
/// # Errors
/// Returns error if the file cannot be read or has unknown keys
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CoordinatorConfig> {
    let Some(path) = path else {
        return Ok(CoordinatorConfig::default());
    };
    let toml = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    CoordinatorConfig::from_toml_str(&toml).with_context(|| format!("parsing {}", path.display()))
}

/// Human-readable summary: catalog counts and the state tree
#[must_use]
pub fn inspect(document: &Document) -> String {
    let mut out = String::new();
    let catalog = &document.type_catalog;
    let _ = writeln!(out, "{} ({})", document.title, document.id);
    let _ = writeln!(
        out,
        "types: {} node, {} edge, {} labels",
        catalog.node_types.len(),
        catalog.edge_types.len(),
        catalog.labels.len()
    );

    let Some(timeline) = &document.timeline else {
        out.push_str("timeline: not initialized\n");
        return out;
    };
    let _ = writeln!(out, "timeline: {} state(s)", timeline.state_count());
    write_subtree(&mut out, timeline, timeline.root_state(), 1);

    let orphans = timeline.orphaned_states();
    if !orphans.is_empty() {
        out.push_str("orphaned:\n");
        for orphan in orphans {
            write_subtree(&mut out, timeline, orphan, 1);
        }
    }
    out
}

fn write_subtree(out: &mut String, timeline: &Timeline, state: &State, depth: usize) {
    let marker = if timeline.current_state_id() == &state.id { " *" } else { "" };
    let _ = writeln!(
        out,
        "{}{}{marker}  [{} actors, {} relations]",
        "  ".repeat(depth),
        state.label,
        state.graph.node_count(),
        state.graph.edge_count()
    );
    for child in timeline.get_child_states(&state.id) {
        write_subtree(out, timeline, child, depth + 1);
    }
}

/// Every structural problem in the document; empty means valid
///
/// States with a missing parent only count under the reparenting policy;
/// with [`OrphanPolicy::Retain`] they are expected.
#[must_use]
pub fn validate(document: &Document, config: &CoordinatorConfig) -> Vec<String> {
    let Some(timeline) = &document.timeline else {
        return Vec::new();
    };
    let tolerate_orphans = config.orphan_policy == OrphanPolicy::Retain;
    let mut problems: Vec<String> = timeline
        .validate()
        .iter()
        .filter(|v| !(tolerate_orphans && !v.is_fatal()))
        .map(ToString::to_string)
        .collect();
    for state in timeline.get_all_states() {
        problems.extend(
            state
                .graph
                .dangling_references()
                .into_iter()
                .map(|r| format!("state {} ({}): {r}", state.label, state.id)),
        );
    }
    problems
}

/// One step of the scripted session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoStep {
    pub action: String,
    pub current_state: String,
    pub actors: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Short content hash of the whole document
    pub fingerprint: String,
}

struct LoggingSink;

impl PersistSink for LoggingSink {
    fn persist(&self, document_id: &DocumentId) {
        info!(document_id = %document_id, "document persisted");
    }
}

/// Run the branch / edit / undo / redo session against an in-memory store
///
/// # Errors
/// Returns error if any coordinator operation fails
pub async fn run_demo(config: CoordinatorConfig) -> anyhow::Result<Vec<DemoStep>> {
    let debounce = config.persist_debounce();
    let live = InMemoryLiveStore::shared();
    let persist = Arc::new(DebouncedPersist::new(LoggingSink, debounce));
    let mut coordinator = DocumentCoordinator::new(config, live.clone()).with_notifier(persist.clone());
    let mut steps = Vec::new();

    coordinator.open_document(Document::new("Demo"))?;
    coordinator.initialize_timeline(Graph::with_nodes(vec![
        Node::new("alice", "Alice", "actor"),
        Node::new("bob", "Bob", "actor"),
    ]))?;
    steps.push(observe(&coordinator, "initialize")?);

    coordinator.create_state("Q2", None, true)?;
    steps.push(observe(&coordinator, "create state Q2")?);

    coordinator.mutate_graph("Add Actor", |g| g.add_node(Node::new("carol", "Carol", "actor")))??;
    steps.push(observe(&coordinator, "add actor")?);

    coordinator.undo()?;
    steps.push(observe(&coordinator, "undo")?);

    coordinator.redo()?;
    steps.push(observe(&coordinator, "redo")?);

    // Let the debounced write land before the runtime shuts down.
    tokio::time::sleep(debounce + Duration::from_millis(50)).await;
    Ok(steps)
}

fn observe(coordinator: &DocumentCoordinator<InMemoryLiveStore>, action: &str) -> anyhow::Result<DemoStep> {
    let live = coordinator.live();
    let timeline = coordinator.timeline()?;
    let snapshot = capture(&live.graph(), timeline, &live.type_catalog());
    Ok(DemoStep {
        action: action.to_string(),
        current_state: timeline.current_state().label.clone(),
        actors: live.graph().node_count(),
        can_undo: coordinator.can_undo(),
        can_redo: coordinator.can_redo(),
        fingerprint: snapshot.fingerprint()?.short(),
    })
}

/// Plain-text rendering of demo steps
#[must_use]
pub fn render_steps(steps: &[DemoStep]) -> String {
    let mut out = String::new();
    for step in steps {
        let _ = writeln!(
            out,
            "{:<16} state={:<14} actors={} undo={} redo={} {}",
            step.action, step.current_state, step.actors, step.can_undo, step.can_redo, step.fingerprint
        );
    }
    out
}
