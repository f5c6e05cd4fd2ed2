//! Page screenshots through a headless Chromium
//!
//! Uses chromiumoxide (CDP). A fresh browser is launched for every capture and
//! closed again afterwards, whether the capture succeeded or not.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default page-load timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

/// Common Chrome executable paths to check
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

const CHROME_COMMANDS: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Page viewport, same size as the window
fn viewport() -> Viewport {
    Viewport {
        width: WINDOW_WIDTH,
        height: WINDOW_HEIGHT,
        ..Default::default()
    }
}

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("page did not load in time")]
    Timeout,

    #[error("Chrome/Chromium not found")]
    BrowserNotFound,

    #[error("browser failed to start: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("capture failed: {0}")]
    Capture(String),
}

/// A rendered page
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub png: Vec<u8>,
    pub title: String,
}

/// URL in, image bytes out
#[async_trait]
pub trait Screenshotter: Send + Sync {
    async fn capture(&self, url: &str) -> Result<Screenshot, ScreenshotError>;
}

/// Screenshot configuration
#[derive(Debug, Clone)]
pub struct ScreenshotConfig {
    /// Page-load timeout
    pub timeout: Duration,
    /// Explicit browser executable
    pub chrome_path: Option<PathBuf>,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            chrome_path: None,
        }
    }
}

impl ScreenshotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_chrome_path(mut self, path: Option<PathBuf>) -> Self {
        self.chrome_path = path;
        self
    }
}

/// Headless Chromium screenshotter
pub struct ChromeScreenshotter {
    config: ScreenshotConfig,
}

impl ChromeScreenshotter {
    pub fn new(config: ScreenshotConfig) -> Self {
        Self { config }
    }

    /// Find the Chrome executable: configured path, well-known paths, then PATH
    fn find_chrome(&self) -> Result<PathBuf, ScreenshotError> {
        if let Some(ref path) = self.config.chrome_path {
            if path.exists() {
                return Ok(path.clone());
            }
            warn!("Configured Chrome path {:?} does not exist", path);
        }

        if let Some(path) = CHROME_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
        {
            debug!("Found Chrome at: {:?}", path);
            return Ok(path);
        }

        CHROME_COMMANDS
            .iter()
            .find_map(|cmd| which::which(cmd).ok())
            .ok_or(ScreenshotError::BrowserNotFound)
    }

    fn browser_config(&self, chrome: PathBuf) -> Result<BrowserConfig, ScreenshotError> {
        BrowserConfig::builder()
            .chrome_executable(chrome)
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .viewport(viewport())
            .request_timeout(self.config.timeout)
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--lang=hu-HU")
            .arg("--no-first-run")
            .build()
            .map_err(ScreenshotError::Launch)
    }

    /// Navigate and capture on an already running browser
    async fn shoot(browser: &Browser, url: &str) -> Result<Screenshot, ScreenshotError> {
        let page = browser
            .new_page(url)
            .await
            .map_err(|e| ScreenshotError::Navigation(e.to_string()))?;

        let title = page
            .get_title()
            .await
            .map_err(|e| ScreenshotError::Navigation(e.to_string()))?
            .unwrap_or_default();

        let png = page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| ScreenshotError::Capture(e.to_string()))?;

        let _ = page.close().await;
        Ok(Screenshot { png, title })
    }
}

#[async_trait]
impl Screenshotter for ChromeScreenshotter {
    async fn capture(&self, url: &str) -> Result<Screenshot, ScreenshotError> {
        let chrome = self.find_chrome()?;
        let config = self.browser_config(chrome)?;

        info!("Launching browser for screenshot of {}", url);
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScreenshotError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let result = match tokio::time::timeout(self.config.timeout, Self::shoot(&browser, url)).await
        {
            Ok(result) => result,
            Err(_) => Err(ScreenshotError::Timeout),
        };

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        let _ = browser.wait().await;
        handler_task.abort();

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screenshot_config_builder() {
        let config = ScreenshotConfig::new()
            .with_timeout(Duration::from_secs(5))
            .with_chrome_path(Some(PathBuf::from("/opt/chrome")));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.chrome_path, Some(PathBuf::from("/opt/chrome")));
        assert_eq!(
            ScreenshotConfig::default().timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_configured_chrome_path_wins() {
        let exe = std::env::current_exe().unwrap();
        let shooter =
            ChromeScreenshotter::new(ScreenshotConfig::new().with_chrome_path(Some(exe.clone())));
        assert_eq!(shooter.find_chrome().unwrap(), exe);
    }

    #[test]
    fn test_viewport_matches_window() {
        let viewport = viewport();
        assert_eq!((viewport.width, viewport.height), (1280, 720));
        assert!(!viewport.emulating_mobile);
    }
}
