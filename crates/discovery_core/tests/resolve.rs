use discovery_core::{CandidateScanner, LinkShapes, Resolver, OWNER_SHORT_URL, OWNER_UNKNOWN};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn owned(owner: &str, identity: &str) -> (String, String) {
    (owner.to_string(), identity.to_string())
}

#[test]
fn canonical_url_yields_owner_and_numeric_id() {
    init_logging();
    let resolver = Resolver::new(&LinkShapes::default());
    assert_eq!(
        resolver.resolve("https://example.com/@alice/item/42"),
        owned("alice", "42")
    );
    assert_eq!(
        resolver.resolve("https://www.tiktok.com/@some.user-1/video/7301234567890?is_from_webapp=1"),
        owned("some.user-1", "7301234567890")
    );
}

#[test]
fn short_link_uses_last_segment() {
    init_logging();
    let shapes = LinkShapes {
        short_link_prefixes: vec!["https://short.example/".to_string()],
        ..LinkShapes::default()
    };
    let resolver = Resolver::new(&shapes);
    assert_eq!(
        resolver.resolve("https://short.example/abc123"),
        owned(OWNER_SHORT_URL, "abc123")
    );
    assert_eq!(
        resolver.resolve("https://short.example/abc123/?ref=share"),
        owned(OWNER_SHORT_URL, "abc123")
    );
}

#[test]
fn default_short_links_cover_redirector_forms() {
    init_logging();
    let resolver = Resolver::new(&LinkShapes::default());
    assert_eq!(
        resolver.resolve("https://vm.tiktok.com/ZMabc123/"),
        owned(OWNER_SHORT_URL, "ZMabc123")
    );
    assert_eq!(
        resolver.resolve("https://www.tiktok.com/t/ZTdef456/"),
        owned(OWNER_SHORT_URL, "ZTdef456")
    );
}

#[test]
fn unresolvable_input_falls_back_to_full_url() {
    init_logging();
    let resolver = Resolver::new(&LinkShapes::default());
    for input in ["https://www.tiktok.com/@alice", "not a url", "https://vm.tiktok.com/"] {
        assert_eq!(resolver.resolve(input), owned(OWNER_UNKNOWN, input));
    }
}

#[test]
fn scanner_resolves_every_candidate() {
    init_logging();
    let scanner = CandidateScanner::new(&LinkShapes::default()).unwrap();
    let page = r#"<a href="/@alice/video/1">a</a> https://vm.tiktok.com/ZMx1/"#;

    let resolved: Vec<_> = scanner
        .scan(page)
        .into_iter()
        .map(|c| (c.owner, c.identity))
        .collect();

    assert_eq!(
        resolved,
        vec![owned(OWNER_SHORT_URL, "ZMx1"), owned("alice", "1")]
    );
}
