//! Proxy parser for the feed body formats

use crate::proxy::models::{ProxyCandidate, ProxyScheme};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

static URL_FORMAT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)(https?|socks[45])://(?:([^:@]+):([^@]+)@)?([^:/@]+):(\d+)/?$")
        .expect("Invalid proxy URL regex")
});

static AUTH_AT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:@]+):([^@]+)@([^:@]+):(\d+)$").expect("Invalid user:pass@host:port regex")
});

/// Matches IP:PORT pairs embedded in arbitrary text
static IP_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}):(\d{1,5})\b")
        .expect("Invalid IP:PORT regex")
});

/// Parser turning feed bodies into proxy candidates
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a whole feed body.
    ///
    /// JSON bodies are read as arrays of `{ip|host, port}` objects. Anything else
    /// is parsed line by line, falling back to regex extraction of `IP:PORT`
    /// pairs when no line parses. Feed order is kept; repeated `host:port`
    /// pairs are dropped after their first occurrence.
    pub fn parse_feed(content: &str, default_scheme: ProxyScheme) -> Vec<ProxyCandidate> {
        let trimmed = content.trim_start();
        let mut proxies = if trimmed.starts_with('[') || trimmed.starts_with('{') {
            Self::parse_json(trimmed, default_scheme).unwrap_or_default()
        } else {
            Vec::new()
        };

        if proxies.is_empty() {
            proxies = Self::parse_string(content, default_scheme);
        }

        if proxies.is_empty() {
            proxies = Self::extract_with_regex(content, default_scheme);
        }

        Self::dedup_stable(proxies)
    }

    /// Parse a single proxy line
    ///
    /// Supports formats:
    /// - IP:PORT
    /// - IP:PORT:USER:PASS
    /// - USER:PASS@IP:PORT
    /// - scheme://IP:PORT
    /// - scheme://USER:PASS@IP:PORT
    pub fn parse_line(line: &str, default_scheme: ProxyScheme) -> Option<ProxyCandidate> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        Self::parse_url_format(line)
            .or_else(|| Self::parse_auth_at_format(line, default_scheme))
            .or_else(|| Self::parse_colon_format(line, default_scheme))
    }

    /// Parse proxies from a string (multiple lines)
    pub fn parse_string(content: &str, default_scheme: ProxyScheme) -> Vec<ProxyCandidate> {
        content
            .lines()
            .filter_map(|line| Self::parse_line(line, default_scheme))
            .collect()
    }

    fn parse_url_format(line: &str) -> Option<ProxyCandidate> {
        let caps = URL_FORMAT_REGEX.captures(line)?;
        let scheme = ProxyScheme::from_name(&caps[1])?;
        let host = caps[4].to_string();
        let port = Self::parse_port(&caps[5])?;

        match (caps.get(2), caps.get(3)) {
            (Some(user), Some(pass)) => Some(ProxyCandidate::with_auth(
                host,
                port,
                scheme,
                user.as_str().to_string(),
                pass.as_str().to_string(),
            )),
            _ => Some(ProxyCandidate::new(host, port, scheme)),
        }
    }

    fn parse_auth_at_format(line: &str, default_scheme: ProxyScheme) -> Option<ProxyCandidate> {
        let caps = AUTH_AT_REGEX.captures(line)?;
        let port = Self::parse_port(&caps[4])?;

        Some(ProxyCandidate::with_auth(
            caps[3].to_string(),
            port,
            default_scheme,
            caps[1].to_string(),
            caps[2].to_string(),
        ))
    }

    fn parse_colon_format(line: &str, default_scheme: ProxyScheme) -> Option<ProxyCandidate> {
        let parts: Vec<&str> = line.split(':').collect();

        match parts.as_slice() {
            [host, port] if !host.is_empty() => {
                Some(ProxyCandidate::new(*host, Self::parse_port(port)?, default_scheme))
            }
            [host, port, user, pass] if !host.is_empty() => Some(ProxyCandidate::with_auth(
                *host,
                Self::parse_port(port)?,
                default_scheme,
                user.to_string(),
                pass.to_string(),
            )),
            _ => None,
        }
    }

    /// Parse JSON feeds: a top-level array, or an array under `data`/`proxies`
    fn parse_json(content: &str, default_scheme: ProxyScheme) -> Option<Vec<ProxyCandidate>> {
        let value: Value = serde_json::from_str(content).ok()?;
        let entries = match &value {
            Value::Array(items) => items,
            Value::Object(map) => map
                .get("data")
                .or_else(|| map.get("proxies"))
                .and_then(Value::as_array)?,
            _ => return None,
        };

        Some(
            entries
                .iter()
                .filter_map(|entry| Self::candidate_from_json(entry, default_scheme))
                .collect(),
        )
    }

    fn candidate_from_json(entry: &Value, default_scheme: ProxyScheme) -> Option<ProxyCandidate> {
        if let Some(line) = entry.as_str() {
            return Self::parse_line(line, default_scheme);
        }

        let host = entry
            .get("ip")
            .or_else(|| entry.get("host"))
            .and_then(Value::as_str)?;
        let port = match entry.get("port")? {
            Value::Number(n) => u16::try_from(n.as_u64()?).ok()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        if port == 0 || host.is_empty() {
            return None;
        }

        let scheme = entry
            .get("protocol")
            .or_else(|| entry.get("type"))
            .and_then(Value::as_str)
            .and_then(ProxyScheme::from_name)
            .unwrap_or(default_scheme);

        Some(ProxyCandidate::new(host, port, scheme))
    }

    /// Extract proxies using regex pattern matching
    fn extract_with_regex(content: &str, default_scheme: ProxyScheme) -> Vec<ProxyCandidate> {
        IP_PORT_REGEX
            .captures_iter(content)
            .filter_map(|cap| {
                let host = cap.get(1)?.as_str();
                let port = Self::parse_port(cap.get(2)?.as_str())?;

                for part in host.split('.') {
                    let num: u32 = part.parse().ok()?;
                    if num > 255 {
                        return None;
                    }
                }

                Some(ProxyCandidate::new(host, port, default_scheme))
            })
            .collect()
    }

    fn parse_port(raw: &str) -> Option<u16> {
        match raw.trim().parse::<u16>() {
            Ok(0) | Err(_) => None,
            Ok(port) => Some(port),
        }
    }

    fn dedup_stable(proxies: Vec<ProxyCandidate>) -> Vec<ProxyCandidate> {
        let mut seen = HashSet::new();
        proxies
            .into_iter()
            .filter(|p| seen.insert((p.host.to_ascii_lowercase(), p.port)))
            .collect()
    }
}
