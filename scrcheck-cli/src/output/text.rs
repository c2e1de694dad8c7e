//! Plain text output formatter

use super::{book_label, OutputFormatter};
use anyhow::Result;
use scrcheck_engine::{BookAnnotations, RunOutcome};
use std::io::Write;

/// Plain text formatter - one line per run, an indented block per book
pub struct TextFormatter<W: Write> {
    writer: W,
    runs: usize,
    created: usize,
    removed: usize,
}

impl<W: Write> TextFormatter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            runs: 0,
            created: 0,
            removed: 0,
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn format_outcome(&mut self, outcome: &RunOutcome) -> Result<()> {
        let summary = &outcome.summary;
        writeln!(
            self.writer,
            "{:<4} {:<28} {:<24} {} new, {} updated, {} unchanged, {} removed",
            book_label(outcome.book),
            outcome.check_name,
            outcome.result.to_string(),
            summary.created,
            summary.updated,
            summary.unchanged,
            summary.removed
        )?;
        self.runs += 1;
        self.created += summary.created;
        self.removed += summary.removed;
        Ok(())
    }

    fn format_book(&mut self, book: &BookAnnotations) -> Result<()> {
        let (open, closed) = book.status_counts();
        writeln!(
            self.writer,
            "{}: {open} open, {closed} closed",
            book_label(book.book)
        )?;
        for run in book.runs() {
            writeln!(self.writer, "  {:<28} {}", run.check_name, run.result)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.runs > 0 {
            writeln!(
                self.writer,
                "{} run(s): {} annotation(s) created, {} removed",
                self.runs, self.created, self.removed
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
