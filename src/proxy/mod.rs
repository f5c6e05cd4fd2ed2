//! Proxy module for finding and probing through Hungarian proxies
//!
//! This module provides functionality for:
//! - Parsing proxy feeds in text, JSON or free-form HTML
//! - Caching the feed and optionally filtering it by GeoIP country
//! - Probing a target through each proxy in turn, with a direct fallback

pub mod feed;
pub mod geo;
pub mod models;
pub mod parser;
pub mod prober;

pub use feed::{CandidateSource, FeedConfig, FeedError, ProxyFeed, DEFAULT_FEED_URL};
pub use geo::{CountryFilter, GeoLocator};
pub use models::{
    AttemptOutcome, ProbeAttempt, ProbeResult, ProbeRoute, ProxyAuth, ProxyCandidate, ProxyScheme,
    Verdict,
};
pub use parser::ProxyParser;
pub use prober::{HttpProbe, ProbeError, ProberConfig, ReachabilityProber, ReqwestProbe};
