//! Single-user history export as one JSON document

use crate::output::traits::OutputResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Exported history of one user
#[derive(Debug, Serialize)]
pub struct HistoryDocument<'a> {
    pub user: &'a str,
    pub exported_at: DateTime<Utc>,
    pub recenttracks: &'a [Value],
}

impl<'a> HistoryDocument<'a> {
    pub fn new(user: &'a str, recenttracks: &'a [Value]) -> Self {
        Self {
            user,
            exported_at: Utc::now(),
            recenttracks,
        }
    }
}

/// Writes the raw history items of `user` to `path`, replacing the file
pub fn write_history_document(path: &Path, user: &str, items: &[Value]) -> OutputResult<()> {
    let document = HistoryDocument::new(user, items);

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &document)?;
    writer.flush()?;

    Ok(())
}

/// Default export file name for `user`
pub fn default_history_path(user: &str) -> String {
    format!("{}.json", user)
}
