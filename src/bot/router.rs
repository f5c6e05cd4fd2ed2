//! Command handlers, independent of the chat transport

use crate::bot::commands::Command;
use crate::bot::i18n::{Lang, Messages};
use crate::bot::lang_store::LanguageStore;
use crate::proxy::ReachabilityProber;
use crate::screenshot::{ScreenshotError, Screenshotter};
use crate::target::Target;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Extra time allowed on top of the page-load timeout for starting the browser
const LAUNCH_GRACE: Duration = Duration::from_secs(10);

/// Where replies for one chat go
#[async_trait]
pub trait ChatOutput: Send + Sync {
    fn chat_id(&self) -> i64;

    async fn send_text(&self, text: String) -> Result<()>;

    async fn send_photo(&self, png: Vec<u8>, caption: String) -> Result<()>;
}

/// Routes parsed commands to the prober, the screenshotter and the language store
pub struct CommandRouter {
    prober: ReachabilityProber,
    screenshotter: Arc<dyn Screenshotter>,
    langs: Arc<LanguageStore>,
    screenshot_timeout: Duration,
}

impl CommandRouter {
    pub fn new(
        prober: ReachabilityProber,
        screenshotter: Arc<dyn Screenshotter>,
        langs: Arc<LanguageStore>,
        screenshot_timeout: Duration,
    ) -> Self {
        Self {
            prober,
            screenshotter,
            langs,
            screenshot_timeout,
        }
    }

    /// Messages in the chat's current language
    pub async fn messages(&self, chat_id: i64) -> Messages {
        Messages::new(self.langs.get(chat_id).await)
    }

    pub async fn handle(&self, command: Command, out: &dyn ChatOutput) -> Result<()> {
        let msgs = self.messages(out.chat_id()).await;

        match command {
            Command::Start => out.send_text(msgs.start()).await,
            Command::Help => out.send_text(msgs.help()).await,
            Command::Check(arg) => self.check(&arg, msgs, out).await,
            Command::Shot(arg) | Command::Screenshot(arg) => self.shot(&arg, msgs, out).await,
            Command::Lang(arg) => self.lang(&arg, msgs, out).await,
        }
    }

    async fn check(&self, arg: &str, msgs: Messages, out: &dyn ChatOutput) -> Result<()> {
        if arg.trim().is_empty() {
            return out.send_text(msgs.check_usage()).await;
        }

        let target = match Target::parse(arg) {
            Ok(target) => target,
            Err(e) => return out.send_text(msgs.target_error(&e)).await,
        };

        out.send_text(msgs.checking(&target.host)).await?;

        info!("Chat {} checking {}", out.chat_id(), target.url);
        let result = self.prober.check(&target.url).await;

        out.send_text(msgs.probe_report(&target.host, &result)).await
    }

    async fn shot(&self, arg: &str, msgs: Messages, out: &dyn ChatOutput) -> Result<()> {
        if arg.trim().is_empty() {
            return out.send_text(msgs.shot_usage()).await;
        }

        let target = match Target::parse(arg) {
            Ok(target) => target,
            Err(e) => return out.send_text(msgs.target_error(&e)).await,
        };

        out.send_text(msgs.shooting()).await?;

        info!("Chat {} screenshot of {}", out.chat_id(), target.url);
        let bound = self.screenshot_timeout + LAUNCH_GRACE;
        let captured = match tokio::time::timeout(bound, self.screenshotter.capture(&target.url))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ScreenshotError::Timeout),
        };

        match captured {
            Ok(shot) => {
                out.send_photo(shot.png, msgs.shot_caption(&target.host, &shot.title))
                    .await
            }
            Err(e) => {
                warn!("Screenshot of {} failed: {}", target.url, e);
                out.send_text(msgs.shot_failed(&msgs.shot_error(&e))).await
            }
        }
    }

    async fn lang(&self, arg: &str, msgs: Messages, out: &dyn ChatOutput) -> Result<()> {
        match arg.parse::<Lang>() {
            Ok(lang) => {
                self.langs.set(out.chat_id(), lang).await;
                out.send_text(Messages::new(lang).lang_set()).await
            }
            Err(_) => out.send_text(msgs.lang_usage()).await,
        }
    }
}
