mod support;

use discovery_core::{DiscoveryConfig, DiscoveryQuery, KnownIdentities, SessionState};
use discovery_engine::{ContentSource, Discoverer, FetchSettings, HttpFeedSource, SourceErrorKind};
use pretty_assertions::assert_eq;
use support::{feed_html, init_logging};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

/// The mock server lives on its own runtime; the source blocks on its own.
fn start_server(runtime: &Runtime, pages: &[&[u32]]) -> MockServer {
    runtime.block_on(async {
        let server = MockServer::start().await;
        for (index, ids) in pages.iter().enumerate() {
            let page = index + 1;
            let mock = Mock::given(method("GET")).and(path("/feed"));
            let mock = if page == 1 {
                mock.and(query_param_is_missing("page"))
            } else {
                mock.and(query_param("page", page.to_string()))
            };
            mock.respond_with(html(feed_html(ids)))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(404))
            .with_priority(10)
            .mount(&server)
            .await;
        server
    })
}

#[test]
fn pages_are_appended_to_the_snapshot() {
    init_logging();
    let runtime = Runtime::new().unwrap();
    let server = start_server(&runtime, &[&[1, 2], &[3]]);
    let mut source = HttpFeedSource::new(FetchSettings::default(), "page").unwrap();

    source.navigate(&format!("{}/feed", server.uri())).unwrap();
    source.reveal_more().unwrap();
    let snapshot = source.current_snapshot().unwrap();

    assert!(snapshot.contains("/@creator/video/1"));
    assert!(snapshot.contains("/@creator/video/3"));
    assert!(source.is_alive());
}

#[test]
fn missing_next_page_ends_the_feed_without_error() {
    init_logging();
    let runtime = Runtime::new().unwrap();
    let server = start_server(&runtime, &[&[1]]);
    let mut source = HttpFeedSource::new(FetchSettings::default(), "page").unwrap();

    source.navigate(&format!("{}/feed", server.uri())).unwrap();
    let before = source.current_snapshot().unwrap();
    source.reveal_more().unwrap();
    source.reveal_more().unwrap();

    assert_eq!(source.current_snapshot().unwrap(), before);
    assert!(source.is_alive());
}

#[test]
fn failing_first_page_marks_source_dead() {
    init_logging();
    let runtime = Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        server
    });
    let mut source = HttpFeedSource::new(FetchSettings::default(), "page").unwrap();

    let err = source
        .navigate(&format!("{}/feed", server.uri()))
        .unwrap_err();

    assert_eq!(err.kind, SourceErrorKind::HttpStatus(500));
    assert!(!source.is_alive());
}

#[test]
fn release_is_idempotent_and_stops_the_source() {
    init_logging();
    let mut source = HttpFeedSource::new(FetchSettings::default(), "page").unwrap();
    source.release();
    source.release();
    assert!(!source.is_alive());
    assert_eq!(
        source.navigate("http://127.0.0.1:9/feed").unwrap_err().kind,
        SourceErrorKind::Unavailable
    );
}

#[test]
fn discover_over_http_stalls_when_the_feed_runs_dry() {
    init_logging();
    let runtime = Runtime::new().unwrap();
    let server = start_server(&runtime, &[&[1, 2], &[3]]);
    let mut config = DiscoveryConfig {
        settle_delay_ms: 0,
        stall_limit: 2,
        ..DiscoveryConfig::default()
    };
    config.endpoints.search_url = format!("{}/feed", server.uri());
    let discoverer = Discoverer::new(config).unwrap();
    let mut source = HttpFeedSource::new(FetchSettings::default(), "page").unwrap();
    let query = DiscoveryQuery::search("cats").unwrap();

    let outcome = discoverer
        .discover(&mut source, &query, &KnownIdentities::new())
        .unwrap();

    assert_eq!(outcome.final_state, SessionState::Stalled);
    let ids: Vec<&str> = outcome.items.iter().map(|i| i.identity.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert!(!source.is_alive());
}
