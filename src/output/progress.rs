//! In-place progress line for file staging.

use super::{Verbosity, get_verbosity};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// A git-style progress line that redraws in place on a TTY:
/// `Copying files: 40% (4/10)` then `Copying files: 100% (10/10), done.`
///
/// Nothing is drawn when stderr is not a terminal or output is quiet.
pub struct Progress {
    /// Label shown before the counts
    title: String,
    /// Number of items expected
    total: usize,
    /// Items processed so far
    current: usize,
    /// Whether anything is drawn
    visible: bool,
    /// Last drawn percentage
    last_percent: u8,
    /// Set once the final line is printed
    finished: bool,
}

impl Progress {
    /// Start tracking `total` items
    #[must_use]
    pub fn new(title: &str, total: usize) -> Self {
        let visible =
            io::stderr().is_terminal() && get_verbosity() == Verbosity::Normal && total > 0;

        let progress = Self {
            title: title.to_string(),
            total,
            current: 0,
            visible,
            last_percent: 0,
            finished: false,
        };
        progress.draw();
        progress
    }

    /// Move to `current` items done; redraws only when the percentage changes
    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);

        let percent = percent_of(self.current, self.total);
        if percent != self.last_percent {
            self.last_percent = percent;
            self.draw();
        }
    }

    /// Print the final `done.` line
    pub fn finish(mut self) {
        self.current = self.total;
        self.last_percent = 100;
        self.finished = true;

        if self.visible {
            eprintln!(
                "\r{}: 100% ({}/{}), done.",
                self.title.dimmed(),
                self.total,
                self.total
            );
        }
    }

    fn draw(&self) {
        if !self.visible {
            return;
        }

        eprint!(
            "\r{}: {}% ({}/{})",
            self.title.dimmed(),
            self.last_percent.to_string().dimmed(),
            self.current,
            self.total
        );
        let _ = io::stderr().flush();
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        // Abandoned mid-way (error path): end the partial line
        if self.visible && !self.finished {
            eprintln!();
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn percent_of(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (current.saturating_mul(100) / total).min(100) as u8
}
