//! Client and pagination behavior against a mock API

use crate::{create_test_config, friends_page, tracks_page};
use scrobble_ripple::crawler::{fetch_all, ApiRequest, LinearHistory, Pagination, RateLimitedClient};
use scrobble_ripple::FetchFailure;
use serde_json::json;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, dir: &TempDir) -> RateLimitedClient {
    let config = create_test_config(&server.uri(), dir.path());
    RateLimitedClient::new(&config.api).unwrap()
}

fn friends_pagination() -> Pagination {
    Pagination::new("friends.user", "friends.@attr.totalPages")
}

#[tokio::test]
async fn test_injects_api_key_and_format() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("method", "user.getinfo"))
        .and(query_param("user", "alice"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": { "name": "alice" } })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server, &dir);
    let value = client
        .fetch(&ApiRequest::new("user.getinfo").user("alice"))
        .await
        .unwrap();

    assert_eq!(value["user"]["name"], "alice");
    assert_eq!(client.gate().dispatch_count, 1);
}

#[tokio::test]
async fn test_dispatches_are_spaced() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(3)
        .mount(&server)
        .await;

    let interval = Duration::from_millis(150);
    let mut client = client_for(&server, &dir).with_min_interval(interval);
    let request = ApiRequest::new("user.getinfo").user("alice");

    let start = Instant::now();
    for _ in 0..3 {
        client.fetch(&request).await.unwrap();
    }

    // First dispatch is immediate, the next two each wait one interval
    assert!(start.elapsed() >= interval * 2);
}

#[tokio::test]
async fn test_non_200_is_status_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": 6 })))
        .mount(&server)
        .await;

    let mut client = client_for(&server, &dir);
    let result = client.fetch(&ApiRequest::new("user.getinfo").user("ghost")).await;

    assert_eq!(result, Err(FetchFailure::Status(404)));
}

#[tokio::test]
async fn test_bad_body_is_decode_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let mut client = client_for(&server, &dir);
    let result = client.fetch(&ApiRequest::new("user.getinfo")).await;

    assert!(matches!(result, Err(FetchFailure::Decode(_))));
}

#[tokio::test]
async fn test_unreachable_host() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://127.0.0.1:1", dir.path());
    let mut client = RateLimitedClient::new(&config.api).unwrap();

    let result = client.fetch(&ApiRequest::new("user.getinfo")).await;

    assert!(matches!(result, Err(FetchFailure::Unreachable(_))));
}

#[tokio::test]
async fn test_reserved_key_is_never_sent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client_for(&server, &dir);
    let result = client
        .fetch(&ApiRequest::new("user.getinfo").param("format", "xml"))
        .await;

    assert_eq!(result, Err(FetchFailure::ReservedParameter("format".to_string())));
    assert_eq!(client.gate().dispatch_count, 0);
}

#[tokio::test]
async fn test_fetch_all_walks_every_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let pages = [
        ("1", vec![("a", "Finland"), ("b", "Sweden")]),
        ("2", vec![("c", "Finland")]),
        ("3", vec![("d", "Norway")]),
    ];
    for (page, friends) in &pages {
        Mock::given(method("GET"))
            .and(query_param("page", *page))
            .respond_with(ResponseTemplate::new(200).set_body_json(friends_page(friends, 3)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut client = client_for(&server, &dir);
    let template = ApiRequest::new("user.getfriends").user("alice");
    let collection = fetch_all(&mut client, &template, &friends_pagination())
        .await
        .unwrap();

    let names: Vec<&str> = collection
        .items
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
    assert!(collection.is_complete());
}

#[tokio::test]
async fn test_fetch_all_stops_at_failed_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(friends_page(&[("a", "Finland")], 3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(friends_page(&[("z", "Finland")], 3)))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client_for(&server, &dir);
    let template = ApiRequest::new("user.getfriends").user("alice");
    let collection = fetch_all(&mut client, &template, &friends_pagination())
        .await
        .unwrap();

    assert_eq!(collection.items.len(), 1);
    assert_eq!(collection.pages_fetched, 1);
    assert_eq!(collection.total_pages, 3);
    assert!(!collection.is_complete());
}

#[tokio::test]
async fn test_fetch_all_first_page_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server, &dir);
    let template = ApiRequest::new("user.getfriends").user("alice");
    let result = fetch_all(&mut client, &template, &friends_pagination()).await;

    assert!(matches!(result, Err(FetchFailure::Status(503))));
}

#[tokio::test]
async fn test_history_of_250_events_takes_two_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("method", "user.getrecenttracks"))
        .and(query_param("limit", "200"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tracks_page(0, 200, 2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("method", "user.getrecenttracks"))
        .and(query_param("limit", "200"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tracks_page(200, 250, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server, &dir);
    let scrobbles = LinearHistory::new(200)
        .fetch(&mut client, "alice")
        .await
        .unwrap();

    assert_eq!(scrobbles.len(), 250);
    assert_eq!(scrobbles[0].timestamp, Some(1_500_000_000));
    assert_eq!(scrobbles[249].track_id.as_deref(), Some("track-249"));
    assert_eq!(client.gate().dispatch_count, 2);
}
