//! Persisted annotations
//!
//! An [`ErrorRecord`] is split into an [`ErrorKey`] that never changes once
//! the record exists and an [`ErrorPayload`] that reconciliation may replace.
//! Resolution status belongs to people; only [`BookAnnotations::set_status`]
//! changes it.

use crate::check::CheckId;
use crate::history::CheckRunRecord;
use scrcheck_core::{BcvRef, FieldId, ObjectId, RefRange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    #[default]
    Open,
    Closed,
}

/// Who created a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationSource {
    #[default]
    Automated,
    Human,
}

/// Identity of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorKey {
    pub check_id: CheckId,
    pub begin_ref: BcvRef,
    pub end_ref: BcvRef,
    pub field_id: FieldId,
    /// Set on the sentinel that stands in for reports beyond the cap; holds
    /// the message of the capped group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow_of: Option<String>,
}

/// Replaceable content of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub begin_object: ObjectId,
    pub end_object: ObjectId,
    pub begin_offset: usize,
    pub end_offset: usize,
    pub writing_system: String,
    pub quoted_text: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub key: ErrorKey,
    pub payload: ErrorPayload,
    pub status: ResolutionStatus,
    pub categories: Vec<String>,
    pub source: AnnotationSource,
    /// Insertion order within the book
    pub seq: u64,
}

impl ErrorRecord {
    pub fn is_sentinel(&self) -> bool {
        self.key.overflow_of.is_some()
    }

    pub fn range(&self) -> RefRange {
        RefRange::between(self.key.begin_ref, self.key.end_ref)
    }

    /// True for records reconciliation manages for `check_id`.
    pub fn is_automated_for(&self, check_id: CheckId) -> bool {
        self.key.check_id == check_id && self.source == AnnotationSource::Automated
    }
}

/// Annotations and run history of one book.
///
/// Records are kept sorted by `(begin_ref, seq)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAnnotations {
    pub book: u8,
    records: Vec<ErrorRecord>,
    runs: Vec<CheckRunRecord>,
    next_seq: u64,
}

impl BookAnnotations {
    pub fn new(book: u8) -> Self {
        Self {
            book,
            records: Vec::new(),
            runs: Vec::new(),
            next_seq: 1,
        }
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn records_for(&self, check_id: CheckId) -> impl Iterator<Item = &ErrorRecord> {
        self.records
            .iter()
            .filter(move |r| r.key.check_id == check_id)
    }

    pub fn record(&self, seq: u64) -> Option<&ErrorRecord> {
        self.records.iter().find(|r| r.seq == seq)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.runs.is_empty()
    }

    /// Adds a record, assigning its sequence number. Returns that number.
    pub fn insert(
        &mut self,
        key: ErrorKey,
        payload: ErrorPayload,
        status: ResolutionStatus,
        categories: Vec<String>,
        source: AnnotationSource,
    ) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let record = ErrorRecord {
            key,
            payload,
            status,
            categories,
            source,
            seq,
        };
        let pos = self
            .records
            .partition_point(|r| (r.key.begin_ref, r.seq) <= (record.key.begin_ref, seq));
        self.records.insert(pos, record);
        seq
    }

    /// Replaces the payload of record `seq`; returns false if it is gone.
    pub fn replace_payload(&mut self, seq: u64, payload: ErrorPayload) -> bool {
        match self.records.iter_mut().find(|r| r.seq == seq) {
            Some(record) => {
                record.payload = payload;
                true
            }
            None => false,
        }
    }

    /// Moves sentinel `seq` to the location of its group's new first report.
    /// Sequence number, status and categories stay. Ordinary records never
    /// move; returns false for them and for unknown records.
    pub fn reanchor_sentinel(&mut self, seq: u64, key: ErrorKey, payload: ErrorPayload) -> bool {
        if key.overflow_of.is_none() {
            return false;
        }
        let Some(pos) = self
            .records
            .iter()
            .position(|r| r.seq == seq && r.is_sentinel())
        else {
            return false;
        };
        let mut record = self.records.remove(pos);
        record.key = key;
        record.payload = payload;
        let at = self
            .records
            .partition_point(|r| (r.key.begin_ref, r.seq) <= (record.key.begin_ref, record.seq));
        self.records.insert(at, record);
        true
    }

    /// Records a human decision on record `seq`.
    pub fn set_status(&mut self, seq: u64, status: ResolutionStatus) -> bool {
        match self.records.iter_mut().find(|r| r.seq == seq) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    /// Removes every record for which `remove` is true; returns how many.
    pub fn remove_where<F>(&mut self, mut remove: F) -> usize
    where
        F: FnMut(&ErrorRecord) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|r| !remove(r));
        before - self.records.len()
    }

    pub fn runs(&self) -> &[CheckRunRecord] {
        &self.runs
    }

    pub fn run_record(&self, check_id: CheckId) -> Option<&CheckRunRecord> {
        self.runs.iter().find(|r| r.check_id == check_id)
    }

    /// Stores `run`, replacing the previous run of the same check.
    pub fn set_run_record(&mut self, run: CheckRunRecord) {
        match self.runs.iter_mut().find(|r| r.check_id == run.check_id) {
            Some(existing) => *existing = run,
            None => self.runs.push(run),
        }
    }

    /// Open and closed record counts.
    pub fn status_counts(&self) -> (usize, usize) {
        let open = self
            .records
            .iter()
            .filter(|r| r.status == ResolutionStatus::Open)
            .count();
        (open, self.records.len() - open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(verse: u16) -> ErrorKey {
        ErrorKey {
            check_id: CheckId::from_u128(1),
            begin_ref: BcvRef::new(1, 1, verse),
            end_ref: BcvRef::new(1, 1, verse),
            field_id: FieldId::CONTENTS,
            overflow_of: None,
        }
    }

    fn payload(message: &str) -> ErrorPayload {
        ErrorPayload {
            begin_object: ObjectId(1),
            end_object: ObjectId(1),
            begin_offset: 0,
            end_offset: 1,
            writing_system: "en".to_string(),
            quoted_text: "x".to_string(),
            message: message.to_string(),
        }
    }

    fn add(book: &mut BookAnnotations, verse: u16, message: &str) -> u64 {
        book.insert(
            key(verse),
            payload(message),
            ResolutionStatus::Open,
            vec!["Test".to_string()],
            AnnotationSource::Automated,
        )
    }

    #[test]
    fn test_records_sorted_by_ref_then_insertion() {
        let mut book = BookAnnotations::new(1);
        add(&mut book, 5, "a");
        add(&mut book, 2, "b");
        add(&mut book, 5, "c");
        add(&mut book, 3, "d");
        let messages: Vec<&str> = book
            .records()
            .iter()
            .map(|r| r.payload.message.as_str())
            .collect();
        assert_eq!(messages, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_set_status() {
        let mut book = BookAnnotations::new(1);
        let seq = add(&mut book, 1, "a");
        assert!(book.set_status(seq, ResolutionStatus::Closed));
        assert_eq!(book.record(seq).unwrap().status, ResolutionStatus::Closed);
        assert!(!book.set_status(99, ResolutionStatus::Open));
        assert_eq!(book.status_counts(), (0, 1));
    }

    #[test]
    fn test_replace_payload_keeps_key_and_status() {
        let mut book = BookAnnotations::new(1);
        let seq = add(&mut book, 1, "a");
        book.set_status(seq, ResolutionStatus::Closed);
        assert!(book.replace_payload(seq, payload("b")));
        let record = book.record(seq).unwrap();
        assert_eq!(record.payload.message, "b");
        assert_eq!(record.key, key(1));
        assert_eq!(record.status, ResolutionStatus::Closed);
    }
}
