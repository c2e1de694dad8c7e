//! JSON output formatter

use super::{book_label, OutputFormatter};
use anyhow::Result;
use scrcheck_engine::{BookAnnotations, CheckRunResult, RunOutcome};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::UNIX_EPOCH;

/// JSON formatter - collects entries and writes one array on finish
pub struct JsonFormatter<W: Write> {
    writer: W,
    entries: Vec<serde_json::Value>,
}

/// One (book, check) run
#[derive(Debug, Serialize, Deserialize)]
pub struct RunData {
    pub book: String,
    pub check: String,
    pub result: CheckRunResult,
    pub reports: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub elapsed_ms: f64,
}

/// Stored state of one book
#[derive(Debug, Serialize, Deserialize)]
pub struct BookData {
    pub book: String,
    pub open: usize,
    pub closed: usize,
    pub runs: Vec<HistoryData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub check: String,
    pub result: CheckRunResult,
    /// Seconds since the Unix epoch
    pub run_at: u64,
}

impl<W: Write> JsonFormatter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            entries: Vec::new(),
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn format_outcome(&mut self, outcome: &RunOutcome) -> Result<()> {
        let summary = &outcome.summary;
        self.entries.push(serde_json::to_value(RunData {
            book: book_label(outcome.book),
            check: outcome.check_name.clone(),
            result: outcome.result,
            reports: outcome.reports,
            created: summary.created,
            updated: summary.updated,
            unchanged: summary.unchanged,
            removed: summary.removed,
            elapsed_ms: outcome.elapsed.as_secs_f64() * 1000.0,
        })?);
        Ok(())
    }

    fn format_book(&mut self, book: &BookAnnotations) -> Result<()> {
        let (open, closed) = book.status_counts();
        let runs = book
            .runs()
            .iter()
            .map(|run| HistoryData {
                check: run.check_name.clone(),
                result: run.result,
                run_at: run
                    .run_at
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default(),
            })
            .collect();
        self.entries.push(serde_json::to_value(BookData {
            book: book_label(book.book),
            open,
            closed,
            runs,
        })?);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.entries)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_entry() {
        let mut out = Vec::new();
        {
            let mut formatter = JsonFormatter::new(&mut out);
            formatter.format_book(&BookAnnotations::new(40)).unwrap();
            formatter.finish().unwrap();
        }
        let parsed: Vec<BookData> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].book, "MAT");
        assert_eq!(parsed[0].open, 0);
    }
}
