//! End-to-end crawl tests
//!
//! Each test mounts a small friend graph or history set on a mock server
//! and runs the public entry points against tempfile-backed sinks.

use crate::{create_test_config, friends_page, read_file_lines, tracks_page};
use scrobble_ripple::config::Config;
use scrobble_ripple::crawler::{crawl_histories, crawl_users, export_history};
use scrobble_ripple::output::{NoopObserver, RecordingObserver};
use scrobble_ripple::CrawlError;
use serde_json::Value;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts the friend list of `user`, expecting it to be fetched `times` times
async fn mount_friends(server: &MockServer, user: &str, friends: &[(&str, &str)], times: u64) {
    Mock::given(method("GET"))
        .and(query_param("method", "user.getfriends"))
        .and(query_param("user", user))
        .respond_with(ResponseTemplate::new(200).set_body_json(friends_page(friends, 1)))
        .expect(times)
        .mount(server)
        .await;
}

/// alice -> bob (FI), carol (SE); bob -> alice (FI), dave (FI); dave -> nobody
async fn mount_small_graph(server: &MockServer, times: u64) {
    mount_friends(server, "alice", &[("bob", "Finland"), ("carol", "Sweden")], times).await;
    mount_friends(server, "bob", &[("alice", "Finland"), ("dave", "Finland")], times).await;
    mount_friends(server, "dave", &[], times).await;
    mount_friends(server, "carol", &[], 0).await;
}

fn seeds(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn test_crawl_small_graph() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    mount_small_graph(&server, 1).await;

    let mut observer = RecordingObserver::new();
    let summary = crawl_users(&config, &seeds(&["alice"]), &mut observer)
        .await
        .unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.failed, 0);
    assert!(!summary.cap_reached);

    assert_eq!(read_file_lines(&config.output.names_path), vec!["bob", "dave"]);
    assert_eq!(
        read_file_lines(&config.output.expanded_path),
        vec!["alice", "bob", "dave"]
    );

    assert!(observer.finished);
    assert_eq!(observer.last(), Some((3, 2, 0)));
}

#[tokio::test]
async fn test_rerun_does_no_work() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    // Each list is fetched once across both runs
    mount_small_graph(&server, 1).await;

    crawl_users(&config, &seeds(&["alice"]), &mut NoopObserver)
        .await
        .unwrap();
    let names_before = read_file_lines(&config.output.names_path);

    let summary = crawl_users(&config, &seeds(&["alice"]), &mut NoopObserver)
        .await
        .unwrap();

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.accepted, 0);
    assert_eq!(read_file_lines(&config.output.names_path), names_before);
    assert_eq!(read_file_lines(&config.output.expanded_path).len(), 3);
}

#[tokio::test]
async fn test_resume_expands_pending_accepted() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    // A previous run expanded alice, accepted bob, then stopped
    std::fs::write(&config.output.expanded_path, "alice\n").unwrap();
    std::fs::write(&config.output.names_path, "bob\n").unwrap();

    mount_friends(&server, "alice", &[], 0).await;
    mount_friends(&server, "bob", &[("alice", "Finland"), ("dave", "Finland")], 1).await;
    mount_friends(&server, "dave", &[], 1).await;

    let summary = crawl_users(&config, &seeds(&["alice"]), &mut NoopObserver)
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.accepted, 1);
    assert_eq!(read_file_lines(&config.output.names_path), vec!["bob", "dave"]);
    assert_eq!(
        read_file_lines(&config.output.expanded_path),
        vec!["alice", "bob", "dave"]
    );
}

#[tokio::test]
async fn test_cap_stops_before_next_expansion() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.max_accepted = 1;

    mount_friends(&server, "alice", &[("bob", "Finland"), ("dave", "Finland")], 1).await;
    mount_friends(&server, "bob", &[], 0).await;
    mount_friends(&server, "dave", &[], 0).await;

    let summary = crawl_users(&config, &seeds(&["alice"]), &mut NoopObserver)
        .await
        .unwrap();

    // The page that crossed the cap is finished
    assert_eq!(summary.accepted, 2);
    assert!(summary.cap_reached);
    assert_eq!(summary.remaining, 2);
    assert_eq!(read_file_lines(&config.output.expanded_path), vec!["alice"]);
}

#[tokio::test]
async fn test_cap_counts_acceptances_from_earlier_runs() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.max_accepted = 3;

    // A previous run expanded alice and accepted bob and carl
    std::fs::write(&config.output.expanded_path, "alice\n").unwrap();
    std::fs::write(&config.output.names_path, "bob\ncarl\n").unwrap();

    mount_friends(&server, "alice", &[], 0).await;
    mount_friends(&server, "bob", &[("dave", "Finland")], 1).await;
    mount_friends(&server, "carl", &[("erin", "Finland")], 0).await;
    mount_friends(&server, "dave", &[], 0).await;

    let summary = crawl_users(&config, &seeds(&["alice"]), &mut NoopObserver)
        .await
        .unwrap();

    assert!(summary.cap_reached);
    assert_eq!(summary.accepted, 1);
    assert_eq!(
        read_file_lines(&config.output.names_path),
        vec!["bob", "carl", "dave"]
    );

    // Once the sink holds the cap, a rerun expands nothing
    let summary = crawl_users(&config, &seeds(&["alice"]), &mut NoopObserver)
        .await
        .unwrap();

    assert!(summary.cap_reached);
    assert_eq!(summary.processed, 0);
    assert_eq!(read_file_lines(&config.output.names_path).len(), 3);
}

#[tokio::test]
async fn test_failed_seed_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(query_param("user", "ghost"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_friends(&server, "alice", &[("bob", "Sweden")], 1).await;

    let summary = crawl_users(&config, &seeds(&["ghost", "alice"]), &mut NoopObserver)
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.rejected, 1);
    assert!(read_file_lines(&config.output.names_path).is_empty());
    assert_eq!(
        read_file_lines(&config.output.expanded_path),
        vec!["ghost", "alice"]
    );
}

#[tokio::test]
async fn test_no_seeds_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://127.0.0.1:1", dir.path());

    let result = crawl_users(&config, &[], &mut NoopObserver).await;

    assert!(matches!(result, Err(CrawlError::Seed(_))));
}

async fn mount_history(server: &MockServer, user: &str, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(query_param("method", "user.getrecenttracks"))
        .and(query_param("user", user))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

fn write_names(config: &Config, names: &str) -> std::path::PathBuf {
    let path = std::path::PathBuf::from(&config.output.names_path);
    std::fs::write(&path, names).unwrap();
    path
}

#[tokio::test]
async fn test_history_batch_writes_csv_and_done_cache() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let names = write_names(&config, "alice\nghost\nbob\n");

    mount_history(&server, "alice", tracks_page(0, 3, 1), 1).await;
    mount_history(&server, "bob", tracks_page(10, 12, 1), 1).await;
    Mock::given(method("GET"))
        .and(query_param("user", "ghost"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut observer = RecordingObserver::new();
    let summary = crawl_histories(&config, &names, &mut observer)
        .await
        .unwrap();

    assert_eq!(summary.users_done, 2);
    assert_eq!(summary.users_skipped, 1);
    assert_eq!(summary.records, 5);
    assert_eq!(observer.last(), Some((3, 5, 0)));

    let csv = read_file_lines(&config.output.scrobbles_path);
    assert_eq!(csv.len(), 6);
    assert_eq!(csv[0], "username,url,artist name,artist id,uts time,track id");
    assert_eq!(
        csv[1],
        "alice,https://www.last.fm/music/Artist/_/Track0,Artist,artist-1,1500000000,track-0"
    );
    assert!(csv[5].starts_with("bob,"));

    assert_eq!(read_file_lines(&config.output.done_path), vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_history_batch_skips_done_users() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let names = write_names(&config, "alice\nbob\n");
    std::fs::write(&config.output.done_path, "alice\n").unwrap();

    mount_history(&server, "alice", tracks_page(0, 3, 1), 0).await;
    mount_history(&server, "bob", tracks_page(0, 1, 1), 1).await;

    let summary = crawl_histories(&config, &names, &mut NoopObserver)
        .await
        .unwrap();

    assert_eq!(summary.users_done, 1);
    assert_eq!(read_file_lines(&config.output.done_path), vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_export_history_document() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let output = dir.path().join("alice.json");

    mount_history(&server, "alice", tracks_page(0, 4, 1), 1).await;

    let count = export_history(&config, "alice", &output).await.unwrap();
    assert_eq!(count, 4);

    let document: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(document["user"], "alice");
    assert_eq!(document["recenttracks"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_export_unknown_user() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let output = dir.path().join("ghost.json");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = export_history(&config, "ghost", &output).await;

    assert!(matches!(result, Err(CrawlError::EmptyHistory { .. })));
    assert!(!output.exists());
}
