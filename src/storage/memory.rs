use crate::storage::traits::{check_line, LineSink, StorageResult};

/// In-memory line sink
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl LineSink for MemorySink {
    fn append(&mut self, line: &str) -> StorageResult<()> {
        check_line(line)?;
        self.lines.push(line.to_string());
        Ok(())
    }
}
