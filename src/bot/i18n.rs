//! Hungarian and English reply texts

use crate::proxy::{AttemptOutcome, ProbeAttempt, ProbeResult, ProbeRoute};
use crate::screenshot::ScreenshotError;
use crate::target::TargetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reply language of a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Hu,
    En,
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lang::Hu => write!(f, "hu"),
            Lang::En => write!(f, "en"),
        }
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hu" => Ok(Lang::Hu),
            "en" => Ok(Lang::En),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

/// Localized message catalogue
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    lang: Lang,
}

impl Messages {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }

    fn pick(&self, hu: &'static str, en: &'static str) -> &'static str {
        match self.lang {
            Lang::Hu => hu,
            Lang::En => en,
        }
    }

    pub fn start(&self) -> String {
        self.pick(
            "Szia! Írd be, hogy /check <domain>, és megnézem elérhető-e magyarországról.",
            "Hi! Send /check <domain> and I will tell you whether it is reachable from Hungary.",
        )
        .to_string()
    }

    pub fn help(&self) -> String {
        match self.lang {
            Lang::Hu => "/check <domain> — elérhetőségi teszt magyar proxykon keresztül\n\
                         /shot <domain> — képernyőkép az oldalról\n\
                         /lang <hu|en> — a válaszok nyelve"
                .to_string(),
            Lang::En => "/check <domain> — reachability test through Hungarian proxies\n\
                         /shot <domain> — screenshot of the page\n\
                         /lang <hu|en> — reply language"
                .to_string(),
        }
    }

    pub fn check_usage(&self) -> String {
        self.pick(
            "Használat: /check <domain vagy URL>",
            "Usage: /check <domain or URL>",
        )
        .to_string()
    }

    pub fn shot_usage(&self) -> String {
        self.pick(
            "Használat: /shot <domain vagy URL>",
            "Usage: /shot <domain or URL>",
        )
        .to_string()
    }

    pub fn lang_usage(&self) -> String {
        self.pick("Használat: /lang <hu|en>", "Usage: /lang <hu|en>")
            .to_string()
    }

    pub fn lang_set(&self) -> String {
        self.pick(
            "Rendben, mostantól magyarul válaszolok.",
            "OK, I will reply in English from now on.",
        )
        .to_string()
    }

    pub fn target_error(&self, error: &TargetError) -> String {
        match error {
            TargetError::Empty => self.pick("Üres címet adtál meg.", "The address is empty."),
            TargetError::Invalid(_) => self.pick("Érvénytelen URL.", "Invalid URL."),
        }
        .to_string()
    }

    pub fn checking(&self, host: &str) -> String {
        match self.lang {
            Lang::Hu => format!("🔎 Ellenőrzöm: {} ...", host),
            Lang::En => format!("🔎 Checking: {} ...", host),
        }
    }

    pub fn probe_report(&self, host: &str, result: &ProbeResult) -> String {
        if result.is_reachable() {
            self.reachable_report(host, result)
        } else {
            self.unreachable_report(host, result)
        }
    }

    fn route_label(&self, route: Option<&ProbeRoute>) -> String {
        match route {
            Some(ProbeRoute::Proxy(proxy)) => proxy.to_string(),
            Some(ProbeRoute::Direct) => self
                .pick("közvetlen (proxy nélkül)", "direct (no proxy)")
                .to_string(),
            None => self.pick("ismeretlen", "unknown").to_string(),
        }
    }

    /// One line per failed attempt, `None` for a successful one
    pub fn attempt_error(&self, attempt: &ProbeAttempt) -> Option<String> {
        let label = self.route_label(Some(&attempt.route));
        match &attempt.outcome {
            AttemptOutcome::Reachable { .. } => None,
            AttemptOutcome::HttpStatus(status) => Some(format!("{} → HTTP {}", label, status)),
            AttemptOutcome::Failed(reason) => Some(format!("{}: {}", label, reason)),
            AttemptOutcome::Timeout => Some(format!(
                "{}: {}",
                label,
                self.pick("időtúllépés", "timeout")
            )),
        }
    }

    fn reachable_report(&self, host: &str, result: &ProbeResult) -> String {
        let path = self.route_label(result.route());
        let status = result
            .status_code()
            .map_or_else(|| "n/a".to_string(), |s| s.to_string());
        let elapsed = result.elapsed().map_or(0.0, |d| d.as_secs_f64());
        let attempts = result.attempts.len();

        match self.lang {
            Lang::Hu => format!(
                "✅ {} elérhető magyarországról.\n\
                 Útvonal: {}\n\
                 HTTP állapot: {}\n\
                 Próbálkozások: {}\n\
                 Válaszidő: {:.1} mp",
                host, path, status, attempts, elapsed
            ),
            Lang::En => format!(
                "✅ {} is reachable from Hungary.\n\
                 Path: {}\n\
                 HTTP status: {}\n\
                 Attempts: {}\n\
                 Response time: {:.1} s",
                host, path, status, attempts, elapsed
            ),
        }
    }

    fn unreachable_report(&self, host: &str, result: &ProbeResult) -> String {
        let reason = if result.proxy_list_empty {
            self.pick(
                "Nem sikerült magyar proxykat találni, és a közvetlen lekérés sem járt sikerrel.",
                "No Hungarian proxies were available and the direct request failed too.",
            )
        } else {
            self.pick(
                "Egyik teszt-proxy sem tudta elérni a webhelyet, és a közvetlen lekérés is sikertelen volt.",
                "None of the test proxies could reach the site and the direct request failed too.",
            )
        };

        let errors: Vec<String> = result
            .failures()
            .filter_map(|a| self.attempt_error(a))
            .collect();
        let errors = if errors.is_empty() {
            self.pick("(nincs további információ)", "(no further details)")
                .to_string()
        } else {
            errors.join("\n")
        };

        match self.lang {
            Lang::Hu => format!(
                "⚠️ {} nem volt elérhető magyarországról.\n{}\n\nUtolsó hibák:\n{}",
                host, reason, errors
            ),
            Lang::En => format!(
                "⚠️ {} was not reachable from Hungary.\n{}\n\nRecent errors:\n{}",
                host, reason, errors
            ),
        }
    }

    pub fn shooting(&self) -> String {
        self.pick(
            "📸 Képernyőkép készítése folyamatban...",
            "📸 Taking a screenshot...",
        )
        .to_string()
    }

    pub fn shot_caption(&self, host: &str, title: &str) -> String {
        let title = match title.trim() {
            "" => host,
            t => t,
        };
        match self.lang {
            Lang::Hu => format!(
                "🖼 {}\nOldalcím: {}\nForrás: magyarországi szerver",
                host, title
            ),
            Lang::En => format!("🖼 {}\nPage title: {}\nSource: server in Hungary", host, title),
        }
    }

    pub fn shot_failed(&self, reason: &str) -> String {
        match self.lang {
            Lang::Hu => format!("Nem sikerült a képernyőkép: {}", reason),
            Lang::En => format!("Could not take the screenshot: {}", reason),
        }
    }

    pub fn shot_timeout(&self) -> String {
        self.pick(
            "Időtúllépés történt a képernyőkép készítése közben.",
            "The page did not load in time.",
        )
        .to_string()
    }

    /// Reason shown after `shot_failed`
    pub fn shot_error(&self, error: &ScreenshotError) -> String {
        match (error, self.lang) {
            (ScreenshotError::Timeout, _) => self.shot_timeout(),
            (ScreenshotError::BrowserNotFound, Lang::Hu) => {
                "Nem található Chrome/Chromium böngésző.".to_string()
            }
            (ScreenshotError::BrowserNotFound, Lang::En) => {
                "Chrome/Chromium is not installed.".to_string()
            }
            (ScreenshotError::Launch(e), Lang::Hu) => format!("nem indult el a böngésző: {}", e),
            (ScreenshotError::Launch(e), Lang::En) => format!("the browser did not start: {}", e),
            (ScreenshotError::Navigation(e), Lang::Hu) => {
                format!("az oldal nem tölthető be: {}", e)
            }
            (ScreenshotError::Navigation(e), Lang::En) => {
                format!("the page could not be loaded: {}", e)
            }
            (ScreenshotError::Capture(e), Lang::Hu) => {
                format!("a kép elkészítése nem sikerült: {}", e)
            }
            (ScreenshotError::Capture(e), Lang::En) => format!("capturing the page failed: {}", e),
        }
    }

    pub fn internal_error(&self) -> String {
        self.pick(
            "Váratlan hiba történt, kérlek próbáld újra később.",
            "Something went wrong, please try again later.",
        )
        .to_string()
    }
}
