use url::Url;

use crate::config::parse_base;
use crate::{ConfigError, DiscoveryConfig, FeedEndpoints};

const MIN_SEARCH_LEN: usize = 2;
const MAX_USERNAME_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query cannot be empty")]
    Empty,
    #[error("search term too short: {0:?}")]
    TooShort(String),
    #[error("invalid username format: {0}")]
    InvalidUsername(String),
    #[error("not a platform url: {0}")]
    NotPlatformUrl(String),
    #[error("short links must be resolved first, use the full profile url: {0}")]
    ShortLinkUnresolved(String),
    #[error("could not extract a username from {0}")]
    NoUsername(String),
    #[error("invalid url {input}: {message}")]
    InvalidUrl { input: String, message: String },
}

/// The input of one discovery session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryQuery {
    Search { term: String },
    Channel { username: String },
}

impl DiscoveryQuery {
    pub fn search(term: &str) -> Result<Self, QueryError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(QueryError::Empty);
        }
        if term.chars().count() < MIN_SEARCH_LEN {
            return Err(QueryError::TooShort(term.to_string()));
        }
        Ok(Self::Search {
            term: term.to_string(),
        })
    }

    /// Accepts `@name`, `name`, or a profile/item URL on one of the platform hosts.
    pub fn channel(input: &str, config: &DiscoveryConfig) -> Result<Self, QueryError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(QueryError::Empty);
        }
        let username = if input.starts_with("http") {
            username_from_url(input, config)?
        } else {
            input.trim_start_matches('@').to_string()
        };
        if !is_valid_username(&username) {
            return Err(QueryError::InvalidUsername(username));
        }
        Ok(Self::Channel { username })
    }

    /// Provenance stamped on every item this query discovers.
    pub fn label(&self) -> String {
        match self {
            Self::Search { term } => term.clone(),
            Self::Channel { username } => format!("@{username}"),
        }
    }

    pub fn location(&self, endpoints: &FeedEndpoints) -> Result<Url, ConfigError> {
        match self {
            Self::Search { term } => {
                let mut url = parse_base(&endpoints.search_url)?;
                url.query_pairs_mut().append_pair("q", term);
                Ok(url)
            }
            Self::Channel { username } => {
                let mut url = parse_base(&endpoints.channel_base_url)?;
                url.path_segments_mut()
                    .map_err(|()| ConfigError::InvalidEndpoint {
                        url: endpoints.channel_base_url.clone(),
                        message: "url cannot be a base".to_string(),
                    })?
                    .pop_if_empty()
                    .push(&format!("@{username}"));
                Ok(url)
            }
        }
    }
}

fn username_from_url(input: &str, config: &DiscoveryConfig) -> Result<String, QueryError> {
    if config
        .link_shapes
        .short_link_prefixes
        .iter()
        .any(|prefix| input.starts_with(prefix.as_str()))
    {
        return Err(QueryError::ShortLinkUnresolved(input.to_string()));
    }

    let url = Url::parse(input).map_err(|err| QueryError::InvalidUrl {
        input: input.to_string(),
        message: err.to_string(),
    })?;
    let host = url.host_str().unwrap_or_default();
    if !config
        .endpoints
        .platform_hosts
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(host))
    {
        return Err(QueryError::NotPlatformUrl(input.to_string()));
    }

    url.path_segments()
        .and_then(|mut segments| segments.find(|s| s.starts_with('@')))
        .map(|segment| segment.trim_start_matches('@').to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| QueryError::NoUsername(input.to_string()))
}

/// 1-24 chars of `[A-Za-z0-9._-]`, no special char at either end, never two in a row.
fn is_valid_username(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_USERNAME_LEN {
        return false;
    }
    let is_special = |c: char| matches!(c, '.' | '_' | '-');
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_special(c))
    {
        return false;
    }
    if name.starts_with(is_special) || name.ends_with(is_special) {
        return false;
    }
    !name
        .as_bytes()
        .windows(2)
        .any(|pair| is_special(pair[0] as char) && is_special(pair[1] as char))
}
