//! Persisted document
//!
//! A document owns its timeline and the document-global type catalog.
//! History is runtime-only and never part of the persisted shape.

use actormap_model::{DocumentId, StateId, TypeCatalog};
use actormap_timeline::{StatesRepr, Timeline, TimelineError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors raised while loading or saving a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Malformed JSON or wrong field types
    #[error("document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The timeline section does not form a valid state tree
    #[error("invalid timeline: {0}")]
    InvalidTimeline(#[from] TimelineError),
}

/// One analysis document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDocument")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub type_catalog: TypeCatalog,
    /// `None` until the timeline is initialized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    id: DocumentId,
    title: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    type_catalog: TypeCatalog,
    #[serde(default)]
    timeline: Option<RawTimeline>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeline {
    states: StatesRepr,
    current_state_id: StateId,
    root_state_id: StateId,
}

impl TryFrom<RawDocument> for Document {
    type Error = DocumentError;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        let timeline = raw
            .timeline
            .map(|t| Timeline::from_parts(t.states, t.current_state_id, t.root_state_id))
            .transpose()?;
        Ok(Self {
            id: raw.id,
            title: raw.title,
            created_at: raw.created_at,
            updated_at: raw.updated_at.unwrap_or(raw.created_at),
            type_catalog: raw.type_catalog,
            timeline,
        })
    }
}

impl Document {
    /// New document with the default type catalog and no timeline
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::generate(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            type_catalog: TypeCatalog::default_catalog(),
            timeline: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.id = id.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_type_catalog(mut self, catalog: TypeCatalog) -> Self {
        self.type_catalog = catalog;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Parse a persisted document
    ///
    /// Accepts the `states` collection as a keyed object, a list of states
    /// or a list of `[id, state]` pairs.
    ///
    /// # Errors
    /// - `InvalidTimeline` if the state tree is broken
    /// - `Json` for any other decoding failure
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let raw: RawDocument = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Persisted form, with `states` as a keyed object
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
