use lazy_static::lazy_static;
use regex::Regex;

use engine_logging::engine_warn;

use crate::{ConfigError, Extractor, LinkShapes, OWNER_SHORT_URL, OWNER_UNKNOWN};

lazy_static! {
    static ref CANONICAL_PATH: Regex =
        Regex::new(r"/@([\w.-]+)/(?:video|item)/(\d+)").expect("canonical path pattern compiles");
}

/// A candidate URL together with its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCandidate {
    pub url: String,
    pub owner: String,
    pub identity: String,
}

/// Maps candidate URLs to stable identities. Never fails: unrecognised input
/// degrades to owner `unknown` with the whole URL as identity.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    short_link_prefixes: Vec<String>,
}

impl Resolver {
    pub fn new(shapes: &LinkShapes) -> Self {
        Self {
            short_link_prefixes: shapes.short_link_prefixes.clone(),
        }
    }

    /// Returns `(owner, identity)`.
    pub fn resolve(&self, url: &str) -> (String, String) {
        if let Some(caps) = CANONICAL_PATH.captures(url) {
            return (caps[1].to_string(), caps[2].to_string());
        }

        if let Some(code) = self.short_code(url) {
            return (OWNER_SHORT_URL.to_string(), code.to_string());
        }

        engine_warn!("no identity rule matched {url}; using the full url as identity");
        (OWNER_UNKNOWN.to_string(), url.to_string())
    }

    fn short_code<'u>(&self, url: &'u str) -> Option<&'u str> {
        let rest = self
            .short_link_prefixes
            .iter()
            .find_map(|prefix| url.strip_prefix(prefix.as_str()))?;
        let path = rest.split(['?', '#']).next().unwrap_or_default();
        path.split('/').filter(|segment| !segment.is_empty()).last()
    }
}

/// Extract and resolve in one pass over a snapshot.
pub struct CandidateScanner {
    extractor: Extractor,
    resolver: Resolver,
}

impl CandidateScanner {
    pub fn new(shapes: &LinkShapes) -> Result<Self, ConfigError> {
        Ok(Self {
            extractor: Extractor::new(shapes)?,
            resolver: Resolver::new(shapes),
        })
    }

    pub fn scan(&self, content: &str) -> Vec<ResolvedCandidate> {
        self.extractor
            .extract(content)
            .into_iter()
            .map(|url| {
                let (owner, identity) = self.resolver.resolve(&url);
                ResolvedCandidate {
                    url,
                    owner,
                    identity,
                }
            })
            .collect()
    }
}
