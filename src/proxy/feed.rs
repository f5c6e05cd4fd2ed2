//! Proxy feed: fetches candidate proxies from a third-party list
//!
//! The feed is fetched lazily and cached for the configured TTL. Any fetch
//! failure results in an empty candidate list so that probing can fall back
//! to a direct request.

use crate::proxy::geo::CountryFilter;
use crate::proxy::models::{ProxyCandidate, ProxyScheme};
use crate::proxy::parser::ProxyParser;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default Hungarian HTTPS proxy list
pub const DEFAULT_FEED_URL: &str =
    "https://www.proxy-list.download/api/v1/get?type=https&country=HU";

/// Default timeout for fetching the feed in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default lifetime of a fetched list in seconds
const DEFAULT_CACHE_TTL_SECS: u64 = 900;

/// Default number of candidates handed to the prober
const DEFAULT_MAX_PROXIES: usize = 8;

/// Default user agent for HTTP requests
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Errors while fetching the proxy feed
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("feed returned HTTP {0}")]
    Status(u16),
}

/// Anything that can hand out proxy candidates in probing order
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Candidates to try, already trimmed. Never fails; an empty list means "none".
    async fn candidates(&self) -> Vec<ProxyCandidate>;
}

/// A fixed candidate list
#[async_trait]
impl CandidateSource for Vec<ProxyCandidate> {
    async fn candidates(&self) -> Vec<ProxyCandidate> {
        self.clone()
    }
}

/// Configuration for the proxy feed
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// URL of the proxy list
    pub url: String,
    /// Timeout for the feed request
    pub timeout: Duration,
    /// How long a fetched list stays valid
    pub cache_ttl: Duration,
    /// Maximum number of candidates returned per probe
    pub max_proxies: usize,
    /// Scheme assumed for entries that do not carry one
    pub default_scheme: ProxyScheme,
    /// User agent for the feed request
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_proxies: DEFAULT_MAX_PROXIES,
            default_scheme: ProxyScheme::Http,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: String) -> Self {
        self.url = url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_max_proxies(mut self, max_proxies: usize) -> Self {
        self.max_proxies = max_proxies;
        self
    }

    pub fn with_default_scheme(mut self, scheme: ProxyScheme) -> Self {
        self.default_scheme = scheme;
        self
    }
}

#[derive(Default)]
struct FeedCache {
    proxies: Vec<ProxyCandidate>,
    fetched_at: Option<Instant>,
}

impl FeedCache {
    fn fresh(&self, ttl: Duration) -> Option<&[ProxyCandidate]> {
        match self.fetched_at {
            Some(at) if !self.proxies.is_empty() && at.elapsed() < ttl => Some(&self.proxies),
            _ => None,
        }
    }
}

/// Proxy feed backed by an HTTP proxy list
pub struct ProxyFeed {
    config: FeedConfig,
    client: Client,
    country_filter: Option<CountryFilter>,
    cache: Mutex<FeedCache>,
}

impl ProxyFeed {
    /// Create a new proxy feed with custom configuration
    pub fn with_config(config: FeedConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            config,
            client,
            country_filter: None,
            cache: Mutex::new(FeedCache::default()),
        })
    }

    /// Only keep candidates that geolocate to the filter's country
    pub fn with_country_filter(mut self, filter: CountryFilter) -> Self {
        self.country_filter = Some(filter);
        self
    }

    /// Download and parse the feed, bypassing the cache
    pub async fn fetch(&self) -> Result<Vec<ProxyCandidate>, FeedError> {
        let response = self.client.get(&self.config.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let content = response.text().await?;
        let mut proxies = ProxyParser::parse_feed(&content, self.config.default_scheme);

        if let Some(ref filter) = self.country_filter {
            let before = proxies.len();
            proxies = filter.apply(proxies);
            debug!("GeoIP filter kept {} of {} proxies", proxies.len(), before);
        }

        Ok(proxies)
    }

    /// Full candidate list, refreshed when the cache is stale or empty
    pub async fn all(&self) -> Vec<ProxyCandidate> {
        let mut cache = self.cache.lock().await;
        if let Some(proxies) = cache.fresh(self.config.cache_ttl) {
            return proxies.to_vec();
        }

        match self.fetch().await {
            Ok(proxies) => {
                info!("Loaded {} proxies from feed", proxies.len());
                cache.proxies = proxies;
                cache.fetched_at = Some(Instant::now());
            }
            Err(e) => {
                warn!("Failed to fetch proxy list: {}", e);
                cache.proxies.clear();
                cache.fetched_at = None;
            }
        }

        cache.proxies.clone()
    }
}

#[async_trait]
impl CandidateSource for ProxyFeed {
    async fn candidates(&self) -> Vec<ProxyCandidate> {
        let trimmed = trim_candidates(self.all().await, self.config.max_proxies);
        if trimmed.is_empty() {
            warn!("No proxies available for probing");
        }
        trimmed
    }
}

fn trim_candidates(mut proxies: Vec<ProxyCandidate>, max: usize) -> Vec<ProxyCandidate> {
    proxies.truncate(max);
    proxies
}
