use discovery_core::{DiscoveryConfig, DiscoveryQuery, QueryError};

fn channel(input: &str) -> Result<DiscoveryQuery, QueryError> {
    DiscoveryQuery::channel(input, &DiscoveryConfig::default())
}

fn username(name: &str) -> DiscoveryQuery {
    DiscoveryQuery::Channel {
        username: name.to_string(),
    }
}

#[test]
fn search_terms_are_trimmed_and_validated() {
    assert_eq!(
        DiscoveryQuery::search("  funny cats ").unwrap(),
        DiscoveryQuery::Search {
            term: "funny cats".to_string()
        }
    );
    assert_eq!(DiscoveryQuery::search("   "), Err(QueryError::Empty));
    assert_eq!(
        DiscoveryQuery::search(" x "),
        Err(QueryError::TooShort("x".to_string()))
    );
}

#[test]
fn channel_accepts_handles_and_profile_urls() {
    assert_eq!(channel("@alice").unwrap(), username("alice"));
    assert_eq!(channel("alice").unwrap(), username("alice"));
    assert_eq!(
        channel("https://www.tiktok.com/@alice.b").unwrap(),
        username("alice.b")
    );
    assert_eq!(
        channel("https://m.tiktok.com/@bob_c/video/123").unwrap(),
        username("bob_c")
    );
}

#[test]
fn channel_rejects_bad_inputs() {
    assert_eq!(channel(""), Err(QueryError::Empty));
    assert!(matches!(
        channel("https://vm.tiktok.com/ZMabc/"),
        Err(QueryError::ShortLinkUnresolved(_))
    ));
    assert!(matches!(
        channel("https://youtube.com/@user"),
        Err(QueryError::NotPlatformUrl(_))
    ));
    assert!(matches!(
        channel("https://www.tiktok.com/discover"),
        Err(QueryError::NoUsername(_))
    ));
    let bad_names = [
        "invalid@username",
        ".alice",
        "alice_",
        "al..ice",
        "a-_b",
        "abcdefghijklmnopqrstuvwxyz",
    ];
    for bad in bad_names {
        assert!(
            matches!(channel(bad), Err(QueryError::InvalidUsername(_))),
            "expected {bad} to be rejected"
        );
    }
}

#[test]
fn labels_record_provenance() {
    assert_eq!(DiscoveryQuery::search("funny cats").unwrap().label(), "funny cats");
    assert_eq!(channel("alice").unwrap().label(), "@alice");
}

#[test]
fn locations_follow_endpoints() {
    let config = DiscoveryConfig::default();
    let search = DiscoveryQuery::search("funny cats").unwrap();
    assert_eq!(
        search.location(&config.endpoints).unwrap().as_str(),
        "https://www.tiktok.com/search?q=funny+cats"
    );
    let profile = channel("@alice").unwrap();
    assert_eq!(
        profile.location(&config.endpoints).unwrap().as_str(),
        "https://www.tiktok.com/@alice"
    );
}
