//! Runtime configuration from flags, environment and `.env`

use crate::bot::Lang;
use crate::proxy::{FeedConfig, ProberConfig, DEFAULT_FEED_URL};
use crate::screenshot::ScreenshotConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Telegram bot that checks whether a website is reachable from Hungary
#[derive(Parser, Debug, Clone)]
#[command(name = "hu-reach-bot", version)]
#[command(about = "Telegram bot that checks whether a website is reachable from Hungary")]
pub struct Config {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// URL of the Hungarian proxy list
    #[arg(long, env = "HU_PROXY_FEED", default_value = DEFAULT_FEED_URL)]
    pub proxy_feed: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Reply language for chats that never used /lang
    #[arg(long, env = "DEFAULT_LANG", default_value = "hu")]
    pub default_lang: Lang,

    /// Timeout in seconds for each proxy or direct attempt
    #[arg(long, env = "PROXY_TIMEOUT_SECS", default_value = "12")]
    pub proxy_timeout: u64,

    /// Timeout in seconds for fetching the proxy list
    #[arg(long, env = "FEED_TIMEOUT_SECS", default_value = "10")]
    pub feed_timeout: u64,

    /// How long in seconds a fetched proxy list is reused
    #[arg(long, env = "FEED_CACHE_TTL_SECS", default_value = "900")]
    pub feed_cache_ttl: u64,

    /// Number of proxies tried per check
    #[arg(long, env = "MAX_PROXIES", default_value = "8")]
    pub max_proxies: usize,

    /// Page-load timeout in seconds for screenshots
    #[arg(long, env = "SCREENSHOT_TIMEOUT_SECS", default_value = "20")]
    pub screenshot_timeout: u64,

    /// Chrome/Chromium executable used for screenshots
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// MaxMind country database used to keep only proxies in GEOIP_COUNTRY
    #[arg(long, env = "GEOIP_DB")]
    pub geoip_db: Option<PathBuf>,

    /// Country code required by the GeoIP filter
    #[arg(long, env = "GEOIP_COUNTRY", default_value = "HU")]
    pub geoip_country: String,
}

impl Config {
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig::new()
            .with_url(self.proxy_feed.clone())
            .with_timeout(Duration::from_secs(self.feed_timeout))
            .with_cache_ttl(Duration::from_secs(self.feed_cache_ttl))
            .with_max_proxies(self.max_proxies)
    }

    pub fn prober_config(&self) -> ProberConfig {
        ProberConfig::new().with_attempt_timeout(Duration::from_secs(self.proxy_timeout))
    }

    pub fn screenshot_config(&self) -> ScreenshotConfig {
        ScreenshotConfig::new()
            .with_timeout(Duration::from_secs(self.screenshot_timeout))
            .with_chrome_path(self.chrome_path.clone())
    }

    /// Tracing filter used when RUST_LOG is not set
    pub fn log_filter(&self) -> String {
        format!(
            "hu_reach_bot={},teloxide=warn",
            self.log_level.trim().to_ascii_lowercase()
        )
    }
}
