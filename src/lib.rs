//! Hungarian reachability bot
//!
//! A Telegram bot that tells whether a website can be reached from Hungary by
//! routing requests through public Hungarian proxies, with a direct request
//! from the host as the fallback. It can also screenshot a page with a
//! headless Chromium.

pub mod bot;
pub mod config;
pub mod proxy;
pub mod screenshot;
pub mod target;

pub use config::Config;
pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
