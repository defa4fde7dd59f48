use crate::workflows::intake::{SurveyImportError, SurveyImporter, SurveyTable};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;

pub const DEFAULT_CACHE_CAPACITY: usize = 16;

/// SHA-256 hex digest of an upload.
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Parsed uploads keyed by content hash. Evicts the oldest entry once full.
#[derive(Debug)]
pub struct DatasetCache {
    capacity: usize,
    entries: VecDeque<(String, Arc<SurveyTable>)>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl DatasetCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Arc<SurveyTable>> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, table)| Arc::clone(table))
    }

    /// Stores `table` under `key` and returns the cached table. When `key` is
    /// already present the existing entry wins and `table` is dropped.
    pub fn insert(&mut self, key: String, table: Arc<SurveyTable>) -> Arc<SurveyTable> {
        if let Some(existing) = self.get(&key) {
            return existing;
        }
        while self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.pop_front() {
                tracing::debug!(key = %evicted, "dataset evicted from cache");
            }
        }
        self.entries.push_back((key, Arc::clone(&table)));
        table
    }
}

/// Imports an upload held in memory.
pub fn parse_upload(csv: &str) -> Result<SurveyTable, SurveyImportError> {
    SurveyImporter::from_reader(Cursor::new(csv.as_bytes()))
}
