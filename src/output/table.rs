//! Console progress table
//!
//! Renders progress as a fixed-width table whose last line is rewritten in
//! place:
//!
//! ```text
//!
//! |        users |        songs |        to go |         time |
//! |--------------+--------------+--------------+--------------|
//! |           12 |         4810 |          988 |     00:03:41 |
//! ```

use crate::output::traits::ProgressObserver;
use std::io::{self, Stdout, Write};
use std::time::Instant;

/// Minimum column width
pub const DEFAULT_WIDTH: usize = 12;

/// Progress observer that draws a table on a terminal
pub struct TableObserver<W: Write = Stdout> {
    out: W,
    width: usize,
    columns: usize,
    started: Instant,
}

impl TableObserver<Stdout> {
    /// Creates a table on stdout and prints its header
    pub fn stdout(headers: &[&str]) -> Self {
        Self::new(io::stdout(), headers)
    }
}

impl<W: Write> TableObserver<W> {
    /// Creates a table on `out` and prints its header
    ///
    /// The column width grows to fit the longest header. An elapsed `time`
    /// column is appended after the given headers.
    pub fn new(out: W, headers: &[&str]) -> Self {
        let width = headers
            .iter()
            .map(|h| h.len())
            .chain(std::iter::once(DEFAULT_WIDTH))
            .max()
            .unwrap_or(DEFAULT_WIDTH);

        let mut table = Self {
            out,
            width,
            columns: headers.len() + 1,
            started: Instant::now(),
        };
        table.write_header(headers);
        table
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Consumes the table and returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_header(&mut self, headers: &[&str]) {
        let mut cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        cells.push("time".to_string());

        let header = self.format_row(&cells);
        let spacer = self.spacer();
        self.emit(&format!("\n{}\n{}\n", header, spacer));
    }

    fn format_row(&self, cells: &[String]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .map(|c| format!("{:>width$}", c, width = self.width))
            .collect();
        format!("| {} |", padded.join(" | "))
    }

    fn spacer(&self) -> String {
        let segment = "-".repeat(self.width + 2);
        format!("|{}|", vec![segment; self.columns].join("+"))
    }

    fn emit(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::debug!("Progress table write failed: {}", e);
        }
    }
}

impl<W: Write> ProgressObserver for TableObserver<W> {
    fn report(&mut self, processed: u64, produced: u64, remaining: u64) {
        let cells = vec![
            processed.to_string(),
            produced.to_string(),
            remaining.to_string(),
            format_elapsed(self.started.elapsed().as_secs()),
        ];
        let row = self.format_row(&cells);
        self.emit(&format!("{}\r", row));
    }

    fn finish(&mut self) {
        self.emit("\n");
    }
}

/// Formats whole seconds as `HH:MM:SS`
pub fn format_elapsed(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
