//! Content fingerprints
//!
//! Provides [`Fingerprint`], a 32-byte Blake3 hash over the canonical JSON
//! encoding of a value. Used to compare snapshots and graphs by content and
//! to tag log lines.

use crate::error::ModelError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte content hash (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Hash the JSON encoding of a value
    ///
    /// Map-typed fields must serialize deterministically for two equal
    /// values to share a fingerprint.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn of<T: serde::Serialize>(value: &T) -> Result<Self, ModelError> {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }

    /// First 16 hex chars, for log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Fingerprint {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ModelError::InvalidFingerprint(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ModelError::InvalidFingerprint(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, Node};

    #[test]
    fn equal_graphs_share_fingerprint() {
        let a = Graph::with_nodes(vec![Node::new("a", "Alice", "actor")]);
        let b = a.clone();
        assert_eq!(Fingerprint::of(&a).unwrap(), Fingerprint::of(&b).unwrap());
    }

    #[test]
    fn changed_graph_changes_fingerprint() {
        let a = Graph::with_nodes(vec![Node::new("a", "Alice", "actor")]);
        let b = Graph::with_nodes(vec![Node::new("a", "Alicia", "actor")]);
        assert_ne!(Fingerprint::of(&a).unwrap(), Fingerprint::of(&b).unwrap());
    }

    #[test]
    fn hex_round_trip() {
        let fp = Fingerprint::compute(b"actormap");
        let parsed: Fingerprint = fp.to_string().parse().unwrap();
        assert_eq!(parsed, fp);
        assert_eq!(fp.short().len(), 16);
    }

    #[test]
    fn rejects_wrong_length() {
        let result: Result<Fingerprint, _> = "abcd".parse();
        assert!(matches!(result, Err(ModelError::InvalidFingerprint(_))));
    }
}
