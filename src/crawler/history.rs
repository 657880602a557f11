//! Linear history download - one user's complete listening log
//!
//! No frontier and no expansion: a single user's paginated history is
//! fetched at the largest page size the API allows, then each raw item is
//! flattened into a [`Scrobble`]. [`HistoryBatch`] repeats this for a list of
//! users with a done-cache so interrupted batches resume.

use crate::config::CrawlerConfig;
use crate::crawler::client::{ApiRequest, JsonSource};
use crate::crawler::json_path::JsonPath;
use crate::crawler::paginate::{fetch_all, PageCollection, Pagination};
use crate::output::{BatchSummary, ProgressObserver, RecordSink};
use crate::storage::LineSink;
use crate::{CrawlError, FetchResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// API operation listing a user's recent tracks
pub const HISTORY_METHOD: &str = "user.getrecenttracks";

/// One flattened listening event
///
/// Fields missing from the raw item are `None`; a missing optional field
/// never drops the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scrobble {
    pub user: String,
    pub url: Option<String>,
    pub artist_name: Option<String>,
    pub artist_id: Option<String>,
    pub timestamp: Option<u64>,
    pub track_id: Option<String>,
}

/// Field paths used to flatten a raw history item
struct ScrobbleFields {
    url: JsonPath,
    artist_name: JsonPath,
    artist_id: JsonPath,
    timestamp: JsonPath,
    track_id: JsonPath,
}

impl Default for ScrobbleFields {
    fn default() -> Self {
        Self {
            url: JsonPath::parse("url"),
            artist_name: JsonPath::parse("artist.#text"),
            artist_id: JsonPath::parse("artist.mbid"),
            timestamp: JsonPath::parse("date.uts"),
            track_id: JsonPath::parse("mbid"),
        }
    }
}

/// Flattens one raw history item for `user`
pub fn project_scrobble(user: &str, item: &Value) -> Scrobble {
    let fields = ScrobbleFields::default();
    Scrobble {
        user: user.to_string(),
        url: fields.url.lookup_string(item),
        artist_name: fields.artist_name.lookup_string(item),
        artist_id: fields.artist_id.lookup_string(item),
        timestamp: fields.timestamp.lookup_u64(item).and_then(Result::ok),
        track_id: fields.track_id.lookup_string(item),
    }
}

/// Downloads the complete history of one user
#[derive(Debug, Clone)]
pub struct LinearHistory {
    pagination: Pagination,
}

impl LinearHistory {
    /// Creates a history download using `page_size` items per request
    pub fn new(page_size: u32) -> Self {
        Self {
            pagination: Pagination::new("recenttracks.track", "recenttracks.@attr.totalPages")
                .with_page_size(page_size),
        }
    }

    /// Creates a history download from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.history_page_size)
    }

    pub fn page_size(&self) -> Option<u32> {
        self.pagination.page_size
    }

    /// Fetches the raw history items of `user`
    ///
    /// # Returns
    ///
    /// * `Ok(PageCollection)` - Every page, or the pages before the first failed one
    /// * `Err(FetchFailure)` - The first page could not be fetched
    pub async fn fetch_raw<S>(&self, source: &mut S, user: &str) -> FetchResult<PageCollection>
    where
        S: JsonSource + ?Sized,
    {
        let template = ApiRequest::new(HISTORY_METHOD)
            .user(user)
            .param("extended", "0");
        let collection = fetch_all(source, &template, &self.pagination).await?;

        if !collection.is_complete() {
            tracing::warn!(
                "History of {} is partial: {}/{} pages",
                user,
                collection.pages_fetched,
                collection.total_pages
            );
        }

        Ok(collection)
    }

    /// Fetches and flattens the history of `user`
    pub async fn fetch<S>(&self, source: &mut S, user: &str) -> FetchResult<Vec<Scrobble>>
    where
        S: JsonSource + ?Sized,
    {
        let collection = self.fetch_raw(source, user).await?;
        Ok(collection
            .items
            .iter()
            .map(|item| project_scrobble(user, item))
            .collect())
    }
}

/// Drops users already listed in the done cache, keeping input order
pub fn pending_users(users: Vec<String>, done: &HashSet<String>) -> Vec<String> {
    users.into_iter().filter(|u| !done.contains(u)).collect()
}

/// Downloads the histories of many users, one after another
#[derive(Debug, Clone)]
pub struct HistoryBatch {
    history: LinearHistory,
}

impl HistoryBatch {
    pub fn new(history: LinearHistory) -> Self {
        Self { history }
    }

    /// Runs the batch over `users`
    ///
    /// Each user with at least one record has all rows written to `records`
    /// and is then appended to `done`. Users whose fetch failed or returned
    /// nothing are not cached, so the next run tries them again.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchSummary)` - Counters for the run
    /// * `Err(CrawlError)` - An output sink could not be written
    pub async fn run<S>(
        &self,
        source: &mut S,
        users: &[String],
        records: &mut dyn RecordSink,
        done: &mut dyn LineSink,
        observer: &mut dyn ProgressObserver,
    ) -> Result<BatchSummary, CrawlError>
    where
        S: JsonSource + ?Sized,
    {
        let mut summary = BatchSummary::default();
        let total = users.len() as u64;

        for (index, user) in users.iter().enumerate() {
            observer.report(index as u64, summary.records, total - index as u64);

            let scrobbles = match self.history.fetch(source, user).await {
                Ok(scrobbles) => scrobbles,
                Err(failure) => {
                    tracing::warn!("Skipping {}: {}", user, failure);
                    summary.users_skipped += 1;
                    continue;
                }
            };

            if scrobbles.is_empty() {
                tracing::debug!("No scrobbles for {}", user);
                summary.users_skipped += 1;
                continue;
            }

            for scrobble in &scrobbles {
                records.write_scrobble(scrobble)?;
            }
            done.append(user)?;

            summary.records += scrobbles.len() as u64;
            summary.users_done += 1;
        }

        observer.report(total, summary.records, 0);
        observer.finish();

        Ok(summary)
    }
}
