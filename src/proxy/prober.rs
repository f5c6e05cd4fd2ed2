//! Reachability prober
//!
//! Tries the target through each proxy candidate in order and stops at the
//! first success. When every proxy fails, or there are none, a single direct
//! request decides the verdict.

use crate::proxy::feed::CandidateSource;
use crate::proxy::models::{
    AttemptOutcome, ProbeAttempt, ProbeResult, ProbeRoute, ProxyCandidate, ProxyScheme, Verdict,
};
use async_trait::async_trait;
use reqwest::{redirect, Client, Proxy as ReqwestProxy};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Default timeout for a single attempt in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 12;

/// Maximum redirects followed per attempt
const MAX_REDIRECTS: usize = 10;

/// Errors from a single request
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timed out")]
    Timeout,

    #[error("invalid proxy {0}: {1}")]
    InvalidProxy(String, String),

    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Request(describe_reqwest_error(&e))
        }
    }
}

/// Flattens the error source chain into one line
fn describe_reqwest_error(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

/// A single GET against the target through one route
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// Returns the final HTTP status after redirects
    async fn get(&self, url: &str, route: &ProbeRoute) -> Result<u16, ProbeError>;
}

/// HTTP probe backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    timeout: Duration,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Create a reqwest client for the route
    fn create_client(&self, route: &ProbeRoute) -> Result<Client, ProbeError> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS));

        match route {
            ProbeRoute::Direct => {
                builder = builder.no_proxy();
            }
            ProbeRoute::Proxy(proxy) => {
                builder = builder.proxy(Self::reqwest_proxy(proxy)?);
            }
        }

        builder.build().map_err(ProbeError::from)
    }

    fn reqwest_proxy(proxy: &ProxyCandidate) -> Result<ReqwestProxy, ProbeError> {
        let proxy_url = proxy.url();
        let invalid = |e: reqwest::Error| ProbeError::InvalidProxy(proxy.to_string(), e.to_string());

        match proxy.scheme {
            // Public "https" proxies are plain HTTP CONNECT proxies for HTTPS traffic.
            ProxyScheme::Http | ProxyScheme::Https => {
                let plain = ProxyCandidate {
                    scheme: ProxyScheme::Http,
                    ..proxy.clone()
                };
                ReqwestProxy::all(plain.url()).map_err(invalid)
            }
            ProxyScheme::Socks4 | ProxyScheme::Socks5 => ReqwestProxy::all(&proxy_url).map_err(invalid),
        }
    }
}

impl Default for ReqwestProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str, route: &ProbeRoute) -> Result<u16, ProbeError> {
        let client = self.create_client(route)?;
        let response = client.get(url).send().await?;
        Ok(response.status().as_u16())
    }
}

/// Configuration for the prober
#[derive(Debug, Clone)]
pub struct ProberConfig {
    /// Upper bound for every attempt, proxy or direct
    pub attempt_timeout: Duration,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProberConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }
}

/// Sequential first-success-wins prober
#[derive(Clone)]
pub struct ReachabilityProber {
    config: ProberConfig,
    source: Arc<dyn CandidateSource>,
    http: Arc<dyn HttpProbe>,
}

impl ReachabilityProber {
    pub fn new(
        config: ProberConfig,
        source: Arc<dyn CandidateSource>,
        http: Arc<dyn HttpProbe>,
    ) -> Self {
        Self {
            config,
            source,
            http,
        }
    }

    /// Probe `url` through every candidate, then directly if needed
    pub async fn check(&self, url: &str) -> ProbeResult {
        let candidates = self.source.candidates().await;
        let proxy_list_empty = candidates.is_empty();
        let mut attempts = Vec::with_capacity(candidates.len() + 1);

        for (idx, proxy) in candidates.into_iter().enumerate() {
            debug!("Checking {} via proxy {} ({})", url, proxy, idx + 1);
            let attempt = self.attempt(url, ProbeRoute::Proxy(proxy)).await;
            let success = attempt.is_success();
            attempts.push(attempt);

            if success {
                return ProbeResult {
                    verdict: Verdict::Reachable,
                    attempts,
                    proxy_list_empty,
                };
            }
        }

        debug!("Falling back to a direct request for {}", url);
        let direct = self.attempt(url, ProbeRoute::Direct).await;
        let verdict = if direct.is_success() {
            Verdict::Reachable
        } else {
            Verdict::Unreachable
        };
        attempts.push(direct);

        ProbeResult {
            verdict,
            attempts,
            proxy_list_empty,
        }
    }

    /// One bounded request through `route`
    async fn attempt(&self, url: &str, route: ProbeRoute) -> ProbeAttempt {
        let start = Instant::now();

        let outcome = match tokio::time::timeout(
            self.config.attempt_timeout,
            self.http.get(url, &route),
        )
        .await
        {
            Ok(Ok(status)) if (200..500).contains(&status) => AttemptOutcome::Reachable {
                status,
                elapsed: start.elapsed(),
            },
            Ok(Ok(status)) => AttemptOutcome::HttpStatus(status),
            Ok(Err(ProbeError::Timeout)) | Err(_) => AttemptOutcome::Timeout,
            Ok(Err(e)) => AttemptOutcome::Failed(e.to_string()),
        };

        match &outcome {
            AttemptOutcome::Reachable { status, elapsed } => {
                info!("{} reachable via {} (HTTP {}, {:?})", url, route, status, elapsed)
            }
            AttemptOutcome::HttpStatus(status) => {
                info!("{} via {} answered HTTP {}", url, route, status)
            }
            AttemptOutcome::Failed(reason) => info!("{} via {} failed: {}", url, route, reason),
            AttemptOutcome::Timeout => info!("{} via {} timed out", url, route),
        }

        ProbeAttempt { route, outcome }
    }
}
