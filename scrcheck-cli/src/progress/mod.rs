//! Progress reporting module

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for per-book check runs
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: None,
            quiet,
        }
    }

    /// Initialize the bar for `total_books` books
    pub fn init_books(&mut self, total_books: u64) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total_books);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} books {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(pb);
    }

    /// Update progress for a checked book
    pub fn book_completed(&self, book: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("Checked: {book}"));
            pb.inc(1);
        }
    }

    /// Clear the bar so the summary prints on a clean line
    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
        }
    }
}
