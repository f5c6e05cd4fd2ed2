use anyhow::Context;
use clap::Parser;
use hu_reach_bot::{
    bot::{telegram, CommandRouter, LanguageStore},
    proxy::{CountryFilter, GeoLocator, ProxyFeed, ReachabilityProber, ReqwestProbe},
    screenshot::ChromeScreenshotter,
    Config, Result,
};
use std::sync::Arc;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads the environment
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut feed = ProxyFeed::with_config(config.feed_config())?;
    if let Some(ref path) = config.geoip_db {
        let locator = GeoLocator::from_path(path)
            .with_context(|| format!("Failed to open GeoIP database {:?}", path))?;
        info!("Filtering proxies to country {}", config.geoip_country);
        feed = feed.with_country_filter(CountryFilter::new(locator, config.geoip_country.clone()));
    }

    let prober_config = config.prober_config();
    let prober = ReachabilityProber::new(
        prober_config.clone(),
        Arc::new(feed),
        Arc::new(ReqwestProbe::new(prober_config.attempt_timeout)),
    );

    let screenshot_config = config.screenshot_config();
    let router = Arc::new(CommandRouter::new(
        prober,
        Arc::new(ChromeScreenshotter::new(screenshot_config.clone())),
        Arc::new(LanguageStore::new(config.default_lang)),
        screenshot_config.timeout,
    ));

    info!("Proxy feed: {}", config.proxy_feed);
    telegram::run(Bot::new(config.token.clone()), router).await;

    Ok(())
}
