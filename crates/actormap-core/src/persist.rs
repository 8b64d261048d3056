//! Dirty tracking and debounced persistence
//!
//! The coordinator only *asks* for a write; the write itself happens later,
//! off the caller's path. A later request for the same document supersedes
//! a pending one.

use actormap_model::DocumentId;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Receives "document changed" signals from the coordinator
pub trait PersistNotifier: Send + Sync {
    fn mark_dirty(&self, document_id: &DocumentId);

    /// Fire-and-forget; must not block the caller
    fn schedule_persist(&self, document_id: &DocumentId);
}

/// Ignores every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl PersistNotifier for NoopNotifier {
    fn mark_dirty(&self, _document_id: &DocumentId) {}

    fn schedule_persist(&self, _document_id: &DocumentId) {}
}

/// Performs the actual write
pub trait PersistSink: Send + Sync + 'static {
    fn persist(&self, document_id: &DocumentId);
}

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Debounces persistence per document on the tokio runtime
///
/// Each `schedule_persist` aborts the document's pending write and starts a
/// new timer. Without a runtime the write happens immediately.
pub struct DebouncedPersist<P: PersistSink> {
    sink: Arc<P>,
    delay: Duration,
    pending: Arc<DashMap<DocumentId, Pending>>,
    dirty: Arc<DashSet<DocumentId>>,
    generation: AtomicU64,
}

impl<P: PersistSink> std::fmt::Debug for DebouncedPersist<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedPersist")
            .field("delay", &self.delay)
            .field("pending", &self.pending.len())
            .field("dirty", &self.dirty.len())
            .finish_non_exhaustive()
    }
}

impl<P: PersistSink> DebouncedPersist<P> {
    #[must_use]
    pub fn new(sink: P, delay: Duration) -> Self {
        Self::with_shared_sink(Arc::new(sink), delay)
    }

    #[must_use]
    pub fn with_shared_sink(sink: Arc<P>, delay: Duration) -> Self {
        Self {
            sink,
            delay,
            pending: Arc::new(DashMap::new()),
            dirty: Arc::new(DashSet::new()),
            generation: AtomicU64::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn sink(&self) -> &Arc<P> {
        &self.sink
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self, document_id: &DocumentId) -> bool {
        self.dirty.contains(document_id)
    }

    /// Documents with a write waiting on its timer
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop a pending write, e.g. when its document is discarded
    pub fn cancel(&self, document_id: &DocumentId) -> bool {
        match self.pending.remove(document_id) {
            Some((_, pending)) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }
}

impl<P: PersistSink> PersistNotifier for DebouncedPersist<P> {
    fn mark_dirty(&self, document_id: &DocumentId) {
        self.dirty.insert(document_id.clone());
    }

    fn schedule_persist(&self, document_id: &DocumentId) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(document_id = %document_id, "no async runtime; persisting immediately");
            self.sink.persist(document_id);
            self.dirty.remove(document_id);
            return;
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let sink = Arc::clone(&self.sink);
        let pending = Arc::clone(&self.pending);
        let dirty = Arc::clone(&self.dirty);
        let delay = self.delay;
        let id = document_id.clone();

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(document_id = %id, "persisting document");
            dirty.remove(&id);
            sink.persist(&id);
            pending.remove_if(&id, |_, p| p.generation == generation);
        });

        if let Some(previous) = self
            .pending
            .insert(document_id.clone(), Pending { generation, handle })
        {
            previous.handle.abort();
            debug!(document_id = %document_id, "superseded pending persist");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CountingSink {
        writes: Mutex<Vec<DocumentId>>,
    }

    impl PersistSink for CountingSink {
        fn persist(&self, document_id: &DocumentId) {
            self.writes.lock().push(document_id.clone());
        }
    }

    fn writes(persist: &DebouncedPersist<CountingSink>) -> Vec<DocumentId> {
        persist.sink().writes.lock().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn later_schedule_supersedes_earlier() {
        let persist = DebouncedPersist::new(CountingSink::default(), Duration::from_secs(1));
        let doc = DocumentId::from("doc_a");

        persist.mark_dirty(&doc);
        persist.schedule_persist(&doc);
        tokio::time::sleep(Duration::from_millis(600)).await;
        persist.schedule_persist(&doc);
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(writes(&persist).is_empty());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(writes(&persist), vec![doc.clone()]);
        assert!(!persist.is_dirty(&doc));
        assert_eq!(persist.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn documents_debounce_independently() {
        let persist = DebouncedPersist::new(CountingSink::default(), Duration::from_secs(1));
        let a = DocumentId::from("doc_a");
        let b = DocumentId::from("doc_b");

        persist.schedule_persist(&a);
        persist.schedule_persist(&b);
        persist.schedule_persist(&a);
        tokio::time::sleep(Duration::from_millis(1100)).await;

        let mut written = writes(&persist);
        written.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        assert_eq!(written, vec![a, b]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_write() {
        let persist = DebouncedPersist::new(CountingSink::default(), Duration::from_secs(1));
        let doc = DocumentId::from("doc_a");

        persist.schedule_persist(&doc);
        assert!(persist.cancel(&doc));
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(writes(&persist).is_empty());
        assert!(!persist.cancel(&doc));
    }

    #[test]
    fn without_runtime_writes_immediately() {
        let persist = DebouncedPersist::new(CountingSink::default(), Duration::from_secs(1));
        let doc = DocumentId::from("doc_a");

        persist.mark_dirty(&doc);
        persist.schedule_persist(&doc);

        assert_eq!(writes(&persist), vec![doc.clone()]);
        assert!(!persist.is_dirty(&doc));
    }
}
