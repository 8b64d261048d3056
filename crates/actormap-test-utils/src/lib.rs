//! Testing utilities for the Actormap workspace
//!
//! Shared fixtures and recording doubles for the coordinator's ports.

#![allow(missing_docs)]

use actormap_core::{Document, PersistNotifier, UserFeedback};
use actormap_model::{DocumentId, Edge, Graph, Node, TypeCatalog};
use actormap_timeline::Timeline;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Node of the default "actor" type
pub fn actor(id: &str) -> Node {
    Node::new(id, format!("Actor {id}"), "actor")
}

/// Edge of the default "relation" type
pub fn relation(id: &str, source: &str, target: &str) -> Edge {
    Edge::new(id, source, target, "relation")
}

/// Graph of `n` unconnected actors `a0..a{n-1}`
pub fn graph_with_actors(n: usize) -> Graph {
    Graph::with_nodes((0..n).map(|i| actor(&format!("a{i}"))).collect())
}

/// Document with the default catalog and a timeline rooted at `n` actors
pub fn sample_document(n: usize) -> Document {
    Document::new("Sample")
        .with_type_catalog(TypeCatalog::default_catalog())
        .with_timeline(Timeline::new(graph_with_actors(n)))
}

/// Persistence signal, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistEvent {
    Dirty(DocumentId),
    Scheduled(DocumentId),
}

/// [`PersistNotifier`] that records every signal
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<PersistEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<PersistEvent> {
        self.events.lock().clone()
    }

    pub fn scheduled_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, PersistEvent::Scheduled(_)))
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl PersistNotifier for RecordingNotifier {
    fn mark_dirty(&self, document_id: &DocumentId) {
        self.events.lock().push(PersistEvent::Dirty(document_id.clone()));
    }

    fn schedule_persist(&self, document_id: &DocumentId) {
        self.events
            .lock()
            .push(PersistEvent::Scheduled(document_id.clone()));
    }
}

/// [`UserFeedback`] with pre-scripted confirmation answers
///
/// Answers are consumed in order; once exhausted every confirmation is
/// declined. Errors and questions are recorded.
#[derive(Debug, Default)]
pub struct ScriptedFeedback {
    answers: Mutex<VecDeque<bool>>,
    errors: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedFeedback {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().clone()
    }
}

impl UserFeedback for ScriptedFeedback {
    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.questions.lock().push(message.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }
}

/// Formatted log output of code run under [`LogCapture::run`]
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Run `f` with a debug-level subscriber writing into this capture
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Whether a line at `level` ("WARN", "DEBUG", ...) mentions `message`
    pub fn contains(&self, level: &str, message: &str) -> bool {
        self.lines()
            .iter()
            .any(|line| line.contains(level) && line.contains(message))
    }
}

/// Writer handed out by [`LogCapture`]
pub struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter(Arc::clone(&self.buffer))
    }
}
