//! Scrobble CSV output
//!
//! Six columns per row: `username,url,artist name,artist id,uts time,track id`.
//! Absent fields are written as empty cells. The header is written only when
//! the file is created, so repeated runs keep appending to one table.

use crate::crawler::Scrobble;
use crate::output::traits::{OutputError, OutputResult};
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::Path;

/// Column names of the scrobble table
pub const SCROBBLE_HEADER: [&str; 6] = [
    "username",
    "url",
    "artist name",
    "artist id",
    "uts time",
    "track id",
];

/// Destination for flattened history records
pub trait RecordSink {
    fn write_scrobble(&mut self, scrobble: &Scrobble) -> OutputResult<()>;
}

impl RecordSink for Vec<Scrobble> {
    fn write_scrobble(&mut self, scrobble: &Scrobble) -> OutputResult<()> {
        self.push(scrobble.clone());
        Ok(())
    }
}

/// Appending CSV writer for scrobble rows
pub struct ScrobbleCsvWriter {
    writer: LineWriter<File>,
    rows: u64,
}

impl ScrobbleCsvWriter {
    /// Opens `path` for appending, writing the header if the file is new
    pub fn open(path: &Path) -> OutputResult<Self> {
        let is_new = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| OutputError::Write(format!("{}: {}", path.display(), e)))?;

        let mut writer = LineWriter::new(file);
        if is_new {
            writeln!(writer, "{}", format_row(&SCROBBLE_HEADER))?;
        }

        Ok(Self { writer, rows: 0 })
    }

    /// Rows written through this handle
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl RecordSink for ScrobbleCsvWriter {
    fn write_scrobble(&mut self, scrobble: &Scrobble) -> OutputResult<()> {
        let timestamp = scrobble.timestamp.map(|t| t.to_string());
        let cells = [
            scrobble.user.as_str(),
            scrobble.url.as_deref().unwrap_or(""),
            scrobble.artist_name.as_deref().unwrap_or(""),
            scrobble.artist_id.as_deref().unwrap_or(""),
            timestamp.as_deref().unwrap_or(""),
            scrobble.track_id.as_deref().unwrap_or(""),
        ];
        writeln!(self.writer, "{}", format_row(&cells))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }
}

/// Joins cells into one CSV line
pub fn format_row(cells: &[&str]) -> String {
    cells
        .iter()
        .map(|c| escape_cell(c))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes a cell if it contains a separator, quote or line break
fn escape_cell(cell: &str) -> String {
    if cell.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
