//! Client-side annotation collection for one video.
//!
//! Keeps records in insertion order and reconciles server responses with
//! local edits:
//!
//! - records are replaced by id, never appended twice;
//! - every local edit bumps a per-record revision, and a server response
//!   only replaces the record if no local edit happened after the request
//!   was issued (last local value wins);
//! - responses for ids that are no longer present are dropped.

use crate::annotation::{Annotation, AnnotationPatch};
use crate::types::FrameIndex;

/// Outcome of applying a server response to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteApply {
    /// The record was replaced with the server's copy.
    Applied,
    /// A newer local edit exists; the response was dropped.
    Superseded,
    /// No record with that id exists locally; the response was dropped.
    Unknown,
}

#[derive(Debug, Clone)]
struct Entry {
    annotation: Annotation,
    revision: u64,
}

/// Ordered, id-keyed set of annotations with local revision tracking.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    entries: Vec<Entry>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a store listing. Later duplicates of an id are
    /// dropped.
    pub fn from_records(records: Vec<Annotation>) -> Self {
        let mut set = Self::new();
        set.replace_all(records);
        set
    }

    /// Replace the whole collection (e.g. after a fresh `list`).
    pub fn replace_all(&mut self, records: Vec<Annotation>) {
        self.entries.clear();
        for annotation in records {
            if self.position(&annotation.id).is_none() {
                self.entries.push(Entry {
                    annotation,
                    revision: 0,
                });
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.entries.iter().map(|e| &e.annotation)
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.entries
            .iter()
            .find(|e| e.annotation.id == id)
            .map(|e| &e.annotation)
    }

    pub fn to_vec(&self) -> Vec<Annotation> {
        self.iter().cloned().collect()
    }

    /// Current local revision of a record.
    pub fn revision(&self, id: &str) -> Option<u64> {
        self.position(id).map(|i| self.entries[i].revision)
    }

    /// Add a record returned by a create call.
    ///
    /// Returns `true` when the record was appended. A record whose id is
    /// already present replaces the existing copy in place instead.
    pub fn insert_created(&mut self, annotation: Annotation) -> bool {
        match self.position(&annotation.id) {
            Some(i) => {
                self.entries[i].annotation = annotation;
                false
            }
            None => {
                self.entries.push(Entry {
                    annotation,
                    revision: 0,
                });
                true
            }
        }
    }

    /// Apply a local (optimistic) edit. Returns the new revision, which the
    /// caller passes back to [`apply_remote`](Self::apply_remote) with the
    /// server's response.
    pub fn apply_local(&mut self, id: &str, patch: &AnnotationPatch) -> Option<u64> {
        let i = self.position(id)?;
        let entry = &mut self.entries[i];
        entry.annotation.apply_patch(patch);
        entry.revision += 1;
        Some(entry.revision)
    }

    /// Apply a server response for a request issued at local revision
    /// `issued_at`.
    pub fn apply_remote(&mut self, annotation: Annotation, issued_at: u64) -> RemoteApply {
        let Some(i) = self.position(&annotation.id) else {
            tracing::debug!(annotation_id = %annotation.id, "Dropping response for unknown annotation");
            return RemoteApply::Unknown;
        };
        let entry = &mut self.entries[i];
        if entry.revision != issued_at {
            tracing::debug!(
                annotation_id = %annotation.id,
                issued_at,
                current = entry.revision,
                "Dropping superseded annotation response"
            );
            return RemoteApply::Superseded;
        }
        entry.annotation = annotation;
        RemoteApply::Applied
    }

    /// Remove a record, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<Annotation> {
        let i = self.position(id)?;
        Some(self.entries.remove(i).annotation)
    }

    /// Records whose inclusive range contains `frame`.
    pub fn at_frame(&self, frame: FrameIndex) -> Vec<&Annotation> {
        self.iter().filter(|a| a.range().contains(frame)).collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.annotation.id == id)
    }
}
