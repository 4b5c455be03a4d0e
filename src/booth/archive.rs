//! In-memory archive of finished capture records.
//!
//! Append-only and newest-first. Records are handed out as `Arc`s so the
//! gallery and the export path can hold on to them without copying frames.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;

use super::record::CaptureRecord;

/// Process-wide store of every record captured during this run.
pub struct CaptureArchive {
    records: RwLock<VecDeque<Arc<CaptureRecord>>>,
}

impl CaptureArchive {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
        }
    }

    /// Prepend a record. Visible to `list` and `get` as soon as this returns.
    pub fn add(&self, record: Arc<CaptureRecord>) {
        tracing::info!(
            "Archived capture {} ({} frames, layout {})",
            record.id(),
            record.images().len(),
            record.layout_id()
        );
        self.records.write().push_front(record);
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<Arc<CaptureRecord>> {
        self.records.read().iter().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<Arc<CaptureRecord>> {
        self.records.read().iter().find(|r| r.id() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.read().iter().any(|r| r.id() == id)
    }

    /// Most recently added record.
    pub fn latest(&self) -> Option<Arc<CaptureRecord>> {
        self.records.read().front().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for CaptureArchive {
    fn default() -> Self {
        Self::new()
    }
}
