//! Coordinator edits coalesce into one debounced persistence write.

use actormap_core::{CoordinatorConfig, DebouncedPersist, DocumentCoordinator, InMemoryLiveStore, PersistSink};
use actormap_model::DocumentId;
use actormap_test_utils::{actor, sample_document};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct MemorySink {
    writes: Mutex<Vec<DocumentId>>,
}

impl PersistSink for MemorySink {
    fn persist(&self, document_id: &DocumentId) {
        self.writes.lock().push(document_id.clone());
    }
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_persists_once() {
    let config = CoordinatorConfig::default();
    let sink = Arc::new(MemorySink::default());
    let persist = Arc::new(DebouncedPersist::with_shared_sink(sink.clone(), config.persist_debounce()));
    let mut coordinator =
        DocumentCoordinator::new(config, InMemoryLiveStore::shared()).with_notifier(persist.clone());
    let id = coordinator.open_document(sample_document(1)).unwrap();

    for i in 0..5 {
        coordinator
            .mutate_graph("Add Actor", |g| g.add_node(actor(&format!("x{i}"))))
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    coordinator.undo().unwrap();
    assert!(persist.is_dirty(&id));
    assert!(sink.writes.lock().is_empty());

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(*sink.writes.lock(), vec![id.clone()]);
    assert!(!persist.is_dirty(&id));
    assert_eq!(persist.pending_count(), 0);
}
