use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::{ConfigError, LinkShapes};

const CANONICAL_PATTERN: &str = r"https?://[A-Za-z0-9.-]+/@[\w.-]+/(?:video|item)/\d+";

lazy_static! {
    static ref CANONICAL_URL: Regex =
        Regex::new(CANONICAL_PATTERN).expect("canonical pattern compiles");
    static ref JSON_URL_FIELD: Regex =
        Regex::new(&format!(r#""url":"({CANONICAL_PATTERN})""#))
            .expect("url field pattern compiles");
    static ref JSON_SHARE_URL_FIELD: Regex =
        Regex::new(&format!(r#""shareUrl":"({CANONICAL_PATTERN})""#))
            .expect("shareUrl field pattern compiles");
    static ref ESCAPED_URL: Regex =
        Regex::new(r#"https?:\\/\\/[^"\s<>]+"#).expect("escaped url pattern compiles");
}

/// One structural shape in which a platform embeds item URLs.
///
/// A rule that finds nothing is not an error; only the union across rules matters.
pub trait CandidateRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn collect(&self, content: &str, out: &mut Vec<String>);
}

struct PatternRule {
    name: &'static str,
    regex: Regex,
    group: usize,
}

impl CandidateRule for PatternRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn collect(&self, content: &str, out: &mut Vec<String>) {
        for caps in self.regex.captures_iter(content) {
            if let Some(m) = caps.get(self.group) {
                out.push(m.as_str().to_string());
            }
        }
    }
}

/// Slash-escaped URLs inside inline JSON, e.g. `https:\/\/host\/@a\/video\/1`.
struct EscapedJsonRule;

impl CandidateRule for EscapedJsonRule {
    fn name(&self) -> &'static str {
        "escaped_json"
    }

    fn collect(&self, content: &str, out: &mut Vec<String>) {
        for m in ESCAPED_URL.find_iter(content) {
            let unescaped = m.as_str().replace("\\/", "/");
            if let Some(canonical) = CANONICAL_URL.find(&unescaped) {
                out.push(canonical.as_str().to_string());
            }
        }
    }
}

/// `<a href>` values, relative ones resolved against the platform base.
struct AnchorHrefRule {
    base: Option<Url>,
}

impl CandidateRule for AnchorHrefRule {
    fn name(&self) -> &'static str {
        "anchor_href"
    }

    fn collect(&self, content: &str, out: &mut Vec<String>) {
        let Ok(selector) = Selector::parse("a[href]") else {
            return;
        };
        let document = Html::parse_document(content);
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_href(href, self.base.as_ref()) else {
                continue;
            };
            if let Some(canonical) = CANONICAL_URL.find(url.as_str()) {
                out.push(canonical.as_str().to_string());
            }
        }
    }
}

fn resolve_href(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    if trimmed.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}

/// Ordered set of candidate rules.
pub struct Extractor {
    rules: Vec<Box<dyn CandidateRule>>,
}

impl Extractor {
    /// The platform rule set: canonical URLs, short links, JSON `url`/`shareUrl`
    /// fields, slash-escaped JSON, then anchor hrefs.
    pub fn new(shapes: &LinkShapes) -> Result<Self, ConfigError> {
        let mut rules: Vec<Box<dyn CandidateRule>> = vec![Box::new(PatternRule {
            name: "canonical",
            regex: CANONICAL_URL.clone(),
            group: 0,
        })];

        for prefix in &shapes.short_link_prefixes {
            let pattern = format!("{}[A-Za-z0-9]+/?", regex::escape(prefix));
            let regex = Regex::new(&pattern).map_err(|err| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: err.to_string(),
            })?;
            rules.push(Box::new(PatternRule {
                name: "short_link",
                regex,
                group: 0,
            }));
        }

        rules.push(Box::new(PatternRule {
            name: "json_url",
            regex: JSON_URL_FIELD.clone(),
            group: 1,
        }));
        rules.push(Box::new(PatternRule {
            name: "json_share_url",
            regex: JSON_SHARE_URL_FIELD.clone(),
            group: 1,
        }));
        rules.push(Box::new(EscapedJsonRule));
        rules.push(Box::new(AnchorHrefRule {
            base: Url::parse(&shapes.base_url).ok(),
        }));

        Ok(Self::with_rules(rules))
    }

    pub fn with_rules(rules: Vec<Box<dyn CandidateRule>>) -> Self {
        Self { rules }
    }

    /// Candidate URLs in rule order, deduplicated by exact string, first occurrence kept.
    pub fn extract(&self, content: &str) -> Vec<String> {
        let mut found = Vec::new();
        for rule in &self.rules {
            let before = found.len();
            rule.collect(content, &mut found);
            engine_logging::engine_trace!(
                "rule {} matched {} candidates",
                rule.name(),
                found.len() - before
            );
        }

        let mut seen = HashSet::with_capacity(found.len());
        found.retain(|url| seen.insert(url.clone()));
        found
    }
}
