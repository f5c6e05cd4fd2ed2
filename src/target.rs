//! Normalization of user-supplied targets into URLs

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

static SCHEME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("Invalid scheme regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("empty target")]
    Empty,

    #[error("invalid URL: {0}")]
    Invalid(String),
}

/// A target ready to be probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// URL with a scheme, as requested
    pub url: String,
    /// Lowercase host, with port when one was given
    pub host: String,
}

impl Target {
    /// Parse user input such as `index.hu` or `http://example.com/path`.
    ///
    /// Inputs without a scheme get `https://`. Only http and https are accepted.
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let cleaned = input.trim();
        if cleaned.is_empty() {
            return Err(TargetError::Empty);
        }

        let url = if SCHEME_REGEX.is_match(cleaned) {
            cleaned.to_string()
        } else {
            format!("https://{}", cleaned)
        };

        let parsed = Url::parse(&url).map_err(|e| TargetError::Invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TargetError::Invalid(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TargetError::Invalid(cleaned.to_string()))?
            .to_ascii_lowercase();

        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        };

        Ok(Self { url, host })
    }
}
