//! Run history: one outcome per (book, check)

use crate::annotation::{BookAnnotations, ResolutionStatus};
use crate::check::CheckId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunResult {
    /// No records of the check remain
    NoInconsistencies,
    /// Records remain, all of them closed
    IgnoredInconsistencies,
    /// At least one open record remains
    Inconsistencies,
}

impl fmt::Display for CheckRunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CheckRunResult::NoInconsistencies => "no inconsistencies",
            CheckRunResult::IgnoredInconsistencies => "ignored inconsistencies",
            CheckRunResult::Inconsistencies => "inconsistencies",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunRecord {
    pub check_id: CheckId,
    pub check_name: String,
    pub result: CheckRunResult,
    pub run_at: SystemTime,
}

/// Outcome of `check_id` given the automated records currently in `book`.
/// Records people entered under the check's id do not count.
pub fn run_result(book: &BookAnnotations, check_id: CheckId) -> CheckRunResult {
    let mut any = false;
    for record in book
        .records()
        .iter()
        .filter(|r| r.is_automated_for(check_id))
    {
        if record.status == ResolutionStatus::Open {
            return CheckRunResult::Inconsistencies;
        }
        any = true;
    }
    if any {
        CheckRunResult::IgnoredInconsistencies
    } else {
        CheckRunResult::NoInconsistencies
    }
}

/// Stores the outcome of a finished run and returns it.
pub fn record_run(book: &mut BookAnnotations, check_id: CheckId, check_name: &str) -> CheckRunResult {
    let result = run_result(book, check_id);
    book.set_run_record(CheckRunRecord {
        check_id,
        check_name: check_name.to_string(),
        result,
        run_at: SystemTime::now(),
    });
    log::debug!("book {}: {check_name} -> {result}", book.book);
    result
}
