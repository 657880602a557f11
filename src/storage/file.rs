use crate::storage::traits::{check_line, LineSink, StorageError, StorageResult};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

/// File-backed line sink opened in append mode
///
/// Lines are flushed as they are written, so a killed process loses at most
/// the line being written.
pub struct FileLineSink {
    path: PathBuf,
    writer: LineWriter<File>,
    written: u64,
}

impl FileLineSink {
    /// Opens (creating if needed) `path` for appending
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| StorageError::Open {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: LineWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines appended through this handle
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl LineSink for FileLineSink {
    fn append(&mut self, line: &str) -> StorageResult<()> {
        check_line(line)?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

/// Reads a one-identifier-per-line file
///
/// Blank lines are skipped, surrounding whitespace is trimmed, and duplicates
/// are dropped while keeping first-seen order.
pub fn read_lines(path: &Path) -> StorageResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let mut seen = HashSet::new();
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect())
}

/// Like [`read_lines`], but a missing file reads as empty
///
/// Used for sinks that a first run has not created yet. Any other read
/// failure is still an error.
pub fn read_lines_if_exists(path: &Path) -> StorageResult<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_lines(path)
}

/// Reads a line file into a set (missing file reads as empty)
pub fn read_line_set(path: &Path) -> StorageResult<HashSet<String>> {
    Ok(read_lines_if_exists(path)?.into_iter().collect())
}
