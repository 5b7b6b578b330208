//! Sources of stable block identifiers.

use crc32fast::Hasher;
use uuid::Uuid;

/// Produces fresh identifiers for blocks that lack one.
pub trait IdSource: Send {
    fn next_id(&mut self) -> String;
}

/// Globally unique identifiers (UUID v4). The default for live editing.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Derive a short, stable seed from a document name using CRC32.
pub fn document_seed(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Deterministic `seed-N` identifiers, for tests and reproducible output.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    seed: String,
    count: u32,
}

impl SequentialIds {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Seeded from a document name, so the same file always yields the same
    /// id sequence.
    pub fn for_document(name: &str) -> Self {
        Self::new(document_seed(name))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::new("doc");
        assert_eq!(ids.next_id(), "doc-1");
        assert_eq!(ids.next_id(), "doc-2");
        assert_eq!(ids.count(), 2);
    }

    #[test]
    fn test_document_seed_is_stable() {
        assert_eq!(document_seed("contract.json"), document_seed("contract.json"));
        assert_ne!(document_seed("a.json"), document_seed("b.json"));
        let ids = SequentialIds::for_document("contract.json");
        assert_eq!(ids.seed(), document_seed("contract.json"));
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let mut ids = UuidIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
