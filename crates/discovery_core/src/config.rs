use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("stall limit must be at least 1")]
    ZeroStallLimit,
    #[error("iteration ceiling must be at least 1")]
    ZeroIterationCeiling,
    #[error("max count must be at least 1")]
    ZeroMaxCount,
    #[error("min count {min} exceeds max count {max}")]
    MinExceedsMax { min: usize, max: usize },
    #[error("invalid endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },
    #[error("invalid candidate pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Everything a discovery session needs to know up front.
///
/// Missing fields in a config file fall back to [`DiscoveryConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Lower "satisfied" bound. Only takes effect together with `max_count`.
    pub min_count: Option<usize>,
    pub max_count: Option<usize>,
    pub settle_delay_ms: u64,
    /// Consecutive no-progress iterations before the session stalls.
    pub stall_limit: u32,
    pub iteration_ceiling: u32,
    pub link_shapes: LinkShapes,
    pub endpoints: FeedEndpoints,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_count: None,
            max_count: Some(60),
            settle_delay_ms: 2_000,
            stall_limit: 3,
            iteration_ceiling: 20,
            link_shapes: LinkShapes::default(),
            endpoints: FeedEndpoints::default(),
        }
    }
}

impl DiscoveryConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stall_limit == 0 {
            return Err(ConfigError::ZeroStallLimit);
        }
        if self.iteration_ceiling == 0 {
            return Err(ConfigError::ZeroIterationCeiling);
        }
        if self.max_count == Some(0) {
            return Err(ConfigError::ZeroMaxCount);
        }
        if let (Some(min), Some(max)) = (self.min_count, self.max_count) {
            if min > max {
                return Err(ConfigError::MinExceedsMax { min, max });
            }
        }
        parse_base(&self.endpoints.search_url)?;
        parse_base(&self.endpoints.channel_base_url)?;
        parse_base(&self.link_shapes.base_url)?;
        Ok(())
    }
}

/// URL shapes the extractor and resolver recognise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkShapes {
    /// Base used to resolve relative anchor hrefs.
    pub base_url: String,
    /// Redirector prefixes; the path segment after one of these is the short code.
    pub short_link_prefixes: Vec<String>,
}

impl Default for LinkShapes {
    fn default() -> Self {
        Self {
            base_url: "https://www.tiktok.com".to_string(),
            short_link_prefixes: vec![
                "https://vm.tiktok.com/".to_string(),
                "https://vt.tiktok.com/".to_string(),
                "https://www.tiktok.com/t/".to_string(),
            ],
        }
    }
}

/// Where queries navigate to and how the feed is paged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedEndpoints {
    pub search_url: String,
    pub channel_base_url: String,
    /// Hosts accepted in channel URLs.
    pub platform_hosts: Vec<String>,
    /// Query parameter carrying the page number for "reveal more".
    pub page_param: String,
}

impl Default for FeedEndpoints {
    fn default() -> Self {
        Self {
            search_url: "https://www.tiktok.com/search".to_string(),
            channel_base_url: "https://www.tiktok.com".to_string(),
            platform_hosts: vec![
                "www.tiktok.com".to_string(),
                "tiktok.com".to_string(),
                "m.tiktok.com".to_string(),
            ],
            page_param: "page".to_string(),
        }
    }
}

pub(crate) fn parse_base(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        message: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEndpoint {
            url: raw.to_string(),
            message: "url cannot be a base".to_string(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DiscoveryConfig};

    #[test]
    fn defaults_are_valid() {
        assert_eq!(DiscoveryConfig::default().validate(), Ok(()));
    }

    #[test]
    fn min_above_max_is_rejected() {
        let config = DiscoveryConfig {
            min_count: Some(10),
            max_count: Some(5),
            ..DiscoveryConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MinExceedsMax { min: 10, max: 5 })
        );
    }

    #[test]
    fn zero_limits_are_rejected() {
        let stall = DiscoveryConfig {
            stall_limit: 0,
            ..DiscoveryConfig::default()
        };
        assert_eq!(stall.validate(), Err(ConfigError::ZeroStallLimit));

        let ceiling = DiscoveryConfig {
            iteration_ceiling: 0,
            ..DiscoveryConfig::default()
        };
        assert_eq!(ceiling.validate(), Err(ConfigError::ZeroIterationCeiling));
    }

    #[test]
    fn relative_endpoint_is_rejected() {
        let mut config = DiscoveryConfig::default();
        config.endpoints.search_url = "/search".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }
}
