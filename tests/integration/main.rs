//! Integration tests for scrobble-ripple
//!
//! These tests use wiremock to stand in for the remote API and exercise the
//! client, pagination and both crawl policies end-to-end.

mod client_tests;
mod crawl_tests;

use scrobble_ripple::config::{ApiConfig, Config, CrawlerConfig, OutputConfig};
use serde_json::{json, Value};
use std::path::Path;

/// Builds a configuration pointing at `server_uri` with outputs under `dir`
pub fn create_test_config(server_uri: &str, dir: &Path) -> Config {
    let out = |name: &str| dir.join(name).to_string_lossy().into_owned();

    Config {
        api: ApiConfig {
            base_url: format!("{}/2.0/", server_uri),
            api_key: "test-key".to_string(),
            min_interval_ms: 1, // Very short for testing
            timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        crawler: CrawlerConfig {
            accept_field: "country".to_string(),
            accept_value: "Finland".to_string(),
            max_accepted: 100,
            history_page_size: 200,
        },
        output: OutputConfig {
            names_path: out("names.txt"),
            expanded_path: out("expanded.txt"),
            scrobbles_path: out("scrobbles.csv"),
            done_path: out("done.txt"),
        },
    }
}

/// A friend-list page in the API's layout
pub fn friends_page(friends: &[(&str, &str)], total_pages: u32) -> Value {
    let users: Vec<Value> = friends
        .iter()
        .map(|(name, country)| json!({ "name": name, "country": country }))
        .collect();

    json!({
        "friends": {
            "user": users,
            "@attr": { "page": "1", "totalPages": total_pages.to_string() }
        }
    })
}

/// A recent-tracks page holding items `start..end`
pub fn tracks_page(start: u64, end: u64, total_pages: u32) -> Value {
    let tracks: Vec<Value> = (start..end)
        .map(|i| {
            json!({
                "url": format!("https://www.last.fm/music/Artist/_/Track{}", i),
                "mbid": format!("track-{}", i),
                "artist": { "#text": "Artist", "mbid": "artist-1" },
                "date": { "uts": (1_500_000_000 + i).to_string() }
            })
        })
        .collect();

    json!({
        "recenttracks": {
            "track": tracks,
            "@attr": { "totalPages": total_pages.to_string() }
        }
    })
}

/// Reads a sink file into its lines
pub fn read_file_lines(path: &str) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|l| l.to_string())
        .collect()
}
