//! Live stores read by the rendering layer
//!
//! The graph, the active timeline and the type catalog are what the canvas
//! renders. Undo, redo, state switches and document activation replace all
//! three at once through [`LiveStore::load_document_state`]; observers never
//! see a graph that disagrees with its timeline or group list.

use actormap_model::{DocumentId, Graph, TypeCatalog};
use actormap_timeline::Timeline;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Everything one atomic write replaces
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDocumentState {
    pub document_id: Option<DocumentId>,
    pub graph: Graph,
    pub timeline: Option<Timeline>,
    pub type_catalog: TypeCatalog,
}

impl LoadDocumentState {
    /// Blank state for "no document open"
    #[must_use]
    pub fn empty() -> Self {
        Self {
            document_id: None,
            graph: Graph::new(),
            timeline: None,
            type_catalog: TypeCatalog::new(),
        }
    }
}

/// Consistent view handed to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct LiveView {
    pub document_id: Option<DocumentId>,
    pub graph: Graph,
    pub timeline: Option<Timeline>,
    pub type_catalog: TypeCatalog,
    /// Bumped on every write
    pub revision: u64,
}

/// Live graph, timeline and type catalog
///
/// `set_graph` and `set_type_catalog` serve ordinary edits. Writes that
/// change the graph together with the timeline must use
/// `load_document_state`.
pub trait LiveStore: Send + Sync {
    fn graph(&self) -> Graph;

    fn type_catalog(&self) -> TypeCatalog;

    fn set_graph(&self, graph: Graph);

    fn set_type_catalog(&self, catalog: TypeCatalog);

    /// Replace graph, timeline and catalog in one observable step
    fn load_document_state(&self, state: LoadDocumentState);
}

type Subscriber = Box<dyn Fn(&LiveView) + Send + Sync>;

/// Handle returned by [`InMemoryLiveStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// [`LiveStore`] holding all three values behind one lock
pub struct InMemoryLiveStore {
    state: RwLock<LiveView>,
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for InMemoryLiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLiveStore")
            .field("revision", &self.revision())
            .field("subscribers", &self.subscribers.read().len())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryLiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLiveStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LiveView {
                document_id: None,
                graph: Graph::new(),
                timeline: None,
                type_catalog: TypeCatalog::new(),
                revision: 0,
            }),
            subscribers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Shared handle, the form the coordinator takes
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Snapshot of the current values
    #[must_use]
    pub fn view(&self) -> LiveView {
        self.state.read().clone()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    #[must_use]
    pub fn timeline(&self) -> Option<Timeline> {
        self.state.read().timeline.clone()
    }

    #[must_use]
    pub fn document_id(&self) -> Option<DocumentId> {
        self.state.read().document_id.clone()
    }

    /// Call `f` after every write with the values as of that write
    pub fn subscribe(&self, f: impl Fn(&LiveView) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    fn write(&self, f: impl FnOnce(&mut LiveView)) {
        let view = {
            let mut state = self.state.write();
            f(&mut state);
            state.revision += 1;
            state.clone()
        };
        // Lock released: subscribers may read the store again.
        for (_, subscriber) in self.subscribers.read().iter() {
            subscriber(&view);
        }
    }
}

impl LiveStore for InMemoryLiveStore {
    fn graph(&self) -> Graph {
        self.state.read().graph.clone()
    }

    fn type_catalog(&self) -> TypeCatalog {
        self.state.read().type_catalog.clone()
    }

    fn set_graph(&self, graph: Graph) {
        self.write(|state| state.graph = graph);
    }

    fn set_type_catalog(&self, catalog: TypeCatalog) {
        self.write(|state| state.type_catalog = catalog);
    }

    fn load_document_state(&self, load: LoadDocumentState) {
        self.write(|state| {
            state.document_id = load.document_id;
            state.graph = load.graph;
            state.timeline = load.timeline;
            state.type_catalog = load.type_catalog;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actormap_model::{Group, Node};
    use std::sync::atomic::AtomicUsize;

    fn grouped_graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_group(Group::new("g", "Board")).unwrap();
        graph.add_node(Node::new("a", "Alice", "actor").in_group("g")).unwrap();
        graph
    }

    #[test]
    fn load_replaces_everything_in_one_revision() {
        let store = InMemoryLiveStore::new();
        let timeline = Timeline::new(grouped_graph());

        store.load_document_state(LoadDocumentState {
            document_id: Some(DocumentId::from("doc_1")),
            graph: grouped_graph(),
            timeline: Some(timeline.clone()),
            type_catalog: TypeCatalog::default_catalog(),
        });

        let view = store.view();
        assert_eq!(view.revision, 1);
        assert_eq!(view.graph, grouped_graph());
        assert_eq!(view.timeline, Some(timeline));
        assert_eq!(view.document_id, Some(DocumentId::from("doc_1")));
    }

    #[test]
    fn subscribers_see_consistent_values() {
        let store = Arc::new(InMemoryLiveStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let reader = Arc::clone(&store);
        store.subscribe(move |view| {
            assert!(view.graph.is_consistent());
            // The lock is free again by the time subscribers run.
            assert_eq!(reader.revision(), view.revision);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        store.set_graph(grouped_graph());
        store.load_document_state(LoadDocumentState::empty());

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = InMemoryLiveStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let id = store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        store.set_type_catalog(TypeCatalog::default_catalog());
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_type_catalog(TypeCatalog::new());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.revision(), 2);
    }
}
