//! Annotation reconciliation
//!
//! Matches one run's reports for a (book, check) against the records that
//! check left behind earlier:
//!
//! 1. reports are deduplicated and capped per (message, quote) group;
//! 2. each surviving report is matched to an unclaimed record with the same
//!    key, first on the same owner (same offset, then same quote and
//!    message), then on a different owner with identical offsets, quote and
//!    message (content re-homed to a replacement paragraph); a sentinel
//!    left unmatched follows its (message, quote) group to wherever the
//!    group's first report now is;
//! 3. matched records get the new payload, unmatched reports become open
//!    records, unclaimed records of the check are removed.
//!
//! Resolution status is never read or written here.

use crate::annotation::{
    AnnotationSource, BookAnnotations, ErrorKey, ErrorPayload, ErrorRecord, ResolutionStatus,
};
use crate::check::{CheckId, TextSubstring};
use scrcheck_core::{ObjectId, RefRange};
use std::collections::{HashMap, HashSet};

/// Cap value meaning "no cap".
pub const UNLIMITED: i32 = -1;

/// A report turned into the record it would become.
#[derive(Debug, Clone)]
struct Candidate {
    key: ErrorKey,
    payload: ErrorPayload,
}

/// What a reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
}

impl ReconcileSummary {
    /// Records of the check that exist after the pass.
    pub fn live(&self) -> usize {
        self.created + self.updated + self.unchanged
    }
}

/// Reconciles the reports of one check for one book.
#[derive(Debug, Clone)]
pub struct Reconciler<'a> {
    check_id: CheckId,
    check_name: &'a str,
    max_identical_errors: i32,
    scope: RefRange,
}

impl<'a> Reconciler<'a> {
    /// Reconciler for the whole of `book`, without a cap.
    pub fn new(check_id: CheckId, check_name: &'a str, book: u8) -> Self {
        Self {
            check_id,
            check_name,
            max_identical_errors: UNLIMITED,
            scope: RefRange::whole_book(book),
        }
    }

    /// Keep at most `cap` records per (message, quote); `-1` is unlimited.
    pub fn with_max_identical_errors(mut self, cap: i32) -> Self {
        self.max_identical_errors = cap;
        self
    }

    /// Only records starting inside `scope` take part, so checking one
    /// chapter leaves the rest of the book alone.
    pub fn with_scope(mut self, scope: RefRange) -> Self {
        self.scope = scope;
        self
    }

    fn sentinel_message(&self) -> String {
        format!("Maximum number of {} errors exceeded.", self.check_name)
    }

    fn candidate(&self, report: &TextSubstring, overflow_of: Option<String>) -> Candidate {
        let token = &report.token;
        let begin_offset = report.owner_offset();
        let message = match overflow_of {
            Some(_) => self.sentinel_message(),
            None => report.message.clone(),
        };
        Candidate {
            key: ErrorKey {
                check_id: self.check_id,
                begin_ref: token.start_ref,
                end_ref: token.end_ref,
                field_id: token.field_id,
                overflow_of,
            },
            payload: ErrorPayload {
                begin_object: token.owner,
                end_object: token.owner,
                begin_offset,
                end_offset: begin_offset + report.length,
                writing_system: token.writing_system.clone(),
                quoted_text: report.quote(),
                message,
            },
        }
    }

    /// Deduplicates, groups by (message, quote) and applies the cap.
    fn candidates(&self, reports: &[TextSubstring]) -> Vec<Candidate> {
        let mut seen: HashSet<(String, String, ObjectId, u16, usize, usize)> = HashSet::new();
        let mut group_index: HashMap<(String, String), usize> = HashMap::new();
        let mut groups: Vec<Vec<&TextSubstring>> = Vec::new();

        for report in reports {
            let quote = report.quote();
            let identity = (
                report.message.clone(),
                quote.clone(),
                report.token.owner,
                report.token.field_id.0,
                report.owner_offset(),
                report.length,
            );
            if !seen.insert(identity) {
                continue;
            }
            let index = *group_index
                .entry((report.message.clone(), quote))
                .or_insert_with(|| {
                    groups.push(Vec::new());
                    groups.len() - 1
                });
            groups[index].push(report);
        }

        let mut candidates = Vec::new();
        for group in groups {
            let keep = match usize::try_from(self.max_identical_errors) {
                Ok(cap) if group.len() > cap => cap,
                _ => group.len(),
            };
            for report in &group[..keep] {
                candidates.push(self.candidate(report, None));
            }
            if keep < group.len() {
                let first = group[0];
                log::debug!(
                    "{}: {} identical '{}' reports capped at {keep}",
                    self.check_name,
                    group.len(),
                    first.message
                );
                candidates.push(self.candidate(first, Some(first.message.clone())));
            }
        }
        candidates
    }

    /// Applies one run's reports to `annotations`.
    pub fn reconcile(
        &self,
        annotations: &mut BookAnnotations,
        reports: &[TextSubstring],
    ) -> ReconcileSummary {
        let candidates = self.candidates(reports);
        let existing: Vec<ErrorRecord> = annotations
            .records()
            .iter()
            .filter(|r| r.is_automated_for(self.check_id) && self.scope.contains(&r.key.begin_ref))
            .cloned()
            .collect();
        let mut claimed = vec![false; existing.len()];
        let mut matches: Vec<Option<usize>> = vec![None; candidates.len()];
        let mut pass = |accept: &dyn Fn(&ErrorPayload, &ErrorPayload) -> bool| {
            claim(&candidates, &existing, &mut claimed, &mut matches, accept)
        };

        // stage 1: same owner, same offset
        pass(&|new: &ErrorPayload, old: &ErrorPayload| {
            old.begin_object == new.begin_object && old.begin_offset == new.begin_offset
        });
        // stage 1: same owner, drifted offset
        pass(&|new: &ErrorPayload, old: &ErrorPayload| {
            old.begin_object == new.begin_object
                && old.quoted_text == new.quoted_text
                && old.message == new.message
        });
        // stage 2: replacement owner, identical content
        pass(&|new: &ErrorPayload, old: &ErrorPayload| {
            old.begin_object != new.begin_object
                && old.begin_offset == new.begin_offset
                && old.end_offset == new.end_offset
                && old.quoted_text == new.quoted_text
                && old.message == new.message
        });

        // sentinels: same capped group, first report moved
        for (ci, candidate) in candidates.iter().enumerate() {
            if matches[ci].is_some() || candidate.key.overflow_of.is_none() {
                continue;
            }
            let found = existing.iter().enumerate().position(|(ei, record)| {
                !claimed[ei]
                    && record.key.overflow_of == candidate.key.overflow_of
                    && record.key.field_id == candidate.key.field_id
                    && record.payload.quoted_text == candidate.payload.quoted_text
            });
            if let Some(ei) = found {
                claimed[ei] = true;
                matches[ci] = Some(ei);
            }
        }

        let mut summary = ReconcileSummary::default();
        for (candidate, matched) in candidates.into_iter().zip(matches) {
            match matched {
                Some(ei) if existing[ei].key != candidate.key => {
                    annotations.reanchor_sentinel(existing[ei].seq, candidate.key, candidate.payload);
                    summary.updated += 1;
                }
                Some(ei) => {
                    if existing[ei].payload == candidate.payload {
                        summary.unchanged += 1;
                    } else {
                        annotations.replace_payload(existing[ei].seq, candidate.payload);
                        summary.updated += 1;
                    }
                }
                None => {
                    annotations.insert(
                        candidate.key,
                        candidate.payload,
                        ResolutionStatus::Open,
                        vec![self.check_name.to_string()],
                        AnnotationSource::Automated,
                    );
                    summary.created += 1;
                }
            }
        }

        let stale: HashSet<u64> = existing
            .iter()
            .zip(&claimed)
            .filter(|(_, claimed)| !**claimed)
            .map(|(record, _)| record.seq)
            .collect();
        summary.removed = annotations.remove_where(|r| stale.contains(&r.seq));

        log::debug!(
            "book {} {}: {} created, {} updated, {} unchanged, {} removed",
            annotations.book,
            self.check_name,
            summary.created,
            summary.updated,
            summary.unchanged,
            summary.removed
        );
        summary
    }
}

/// Matches each unmatched candidate to the first unclaimed record with the
/// same key whose payload `accept`s it.
fn claim(
    candidates: &[Candidate],
    existing: &[ErrorRecord],
    claimed: &mut [bool],
    matches: &mut [Option<usize>],
    accept: &dyn Fn(&ErrorPayload, &ErrorPayload) -> bool,
) {
    for (ci, candidate) in candidates.iter().enumerate() {
        if matches[ci].is_some() {
            continue;
        }
        let found = existing.iter().enumerate().position(|(ei, record)| {
            !claimed[ei] && record.key == candidate.key && accept(&candidate.payload, &record.payload)
        });
        if let Some(ei) = found {
            claimed[ei] = true;
            matches[ci] = Some(ei);
        }
    }
}
