//! Country filtering of proxy candidates using a MaxMind MMDB database

use crate::proxy::models::ProxyCandidate;
use crate::Result;
use maxminddb::{geoip2, Reader};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// GeoLocator for looking up IP addresses in MMDB databases
#[derive(Clone)]
pub struct GeoLocator {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoLocator {
    /// Create a new GeoLocator from an MMDB file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// ISO 3166-1 alpha-2 country code for an IP address string
    pub fn country_code(&self, ip_str: &str) -> Result<Option<String>> {
        let ip: IpAddr = ip_str.parse()?;
        let lookup_result = self.reader.lookup(ip)?;
        let country: Option<geoip2::Country> = lookup_result.decode()?;

        Ok(country.and_then(|c| c.country.iso_code.map(String::from)))
    }
}

/// Keeps only candidates located in one country
#[derive(Clone)]
pub struct CountryFilter {
    locator: GeoLocator,
    country: String,
}

impl CountryFilter {
    pub fn new(locator: GeoLocator, country: impl Into<String>) -> Self {
        Self {
            locator,
            country: country.into().to_ascii_uppercase(),
        }
    }

    /// Drop candidates outside the country. Hostnames and failed lookups are dropped too.
    pub fn apply(&self, candidates: Vec<ProxyCandidate>) -> Vec<ProxyCandidate> {
        candidates
            .into_iter()
            .filter(|candidate| match self.locator.country_code(&candidate.host) {
                Ok(code) => country_matches(code.as_deref(), &self.country),
                Err(e) => {
                    debug!("GeoIP lookup failed for {}: {}", candidate, e);
                    false
                }
            })
            .collect()
    }
}

fn country_matches(code: Option<&str>, wanted: &str) -> bool {
    code.is_some_and(|c| c.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_matches() {
        assert!(country_matches(Some("HU"), "HU"));
        assert!(country_matches(Some("hu"), "HU"));
        assert!(!country_matches(Some("AT"), "HU"));
        assert!(!country_matches(None, "HU"));
    }

    #[test]
    fn test_missing_database_is_an_error() {
        assert!(GeoLocator::from_path("/nonexistent/GeoLite2-Country.mmdb").is_err());
    }
}
