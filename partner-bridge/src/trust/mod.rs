//! Origin allow-list for inbound partner messages.
//!
//! This predicate is the only security control of the bridge: every other
//! behavior is gated behind [`OriginTrustPolicy::is_trusted`].

use crate::config::TrustSettings;
use crate::error::BridgeError;
use regex::RegexSet;

/// Static set of trusted origins, validated once at startup.
#[derive(Debug, Clone, Default)]
pub struct TrustedOriginSet {
    /// Exact origins (scheme + host [+ port]), matched byte for byte.
    pub exact: Vec<String>,
    /// Root domains whose `https` subdomains are trusted.
    pub wildcard_domains: Vec<String>,
}

impl From<&TrustSettings> for TrustedOriginSet {
    fn from(settings: &TrustSettings) -> Self {
        Self {
            exact: settings.exact_origins.clone(),
            wildcard_domains: settings.wildcard_domains.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OriginTrustPolicy {
    exact: Vec<String>,
    subdomains: RegexSet,
}

impl OriginTrustPolicy {
    pub fn new(origins: TrustedOriginSet) -> Result<Self, BridgeError> {
        for origin in &origins.exact {
            validate_exact_origin(origin)?;
        }

        let patterns = origins
            .wildcard_domains
            .iter()
            .map(|domain| {
                validate_root_domain(domain)?;
                Ok(subdomain_pattern(domain))
            })
            .collect::<Result<Vec<_>, BridgeError>>()?;

        let subdomains = RegexSet::new(&patterns).map_err(|e| {
            BridgeError::InvalidConfiguration(format!("Failed to compile origin patterns: {}", e))
        })?;

        tracing::debug!(
            exact = origins.exact.len(),
            wildcard = patterns.len(),
            "Origin trust policy loaded"
        );

        Ok(Self {
            exact: origins.exact,
            subdomains,
        })
    }

    pub fn from_settings(settings: &TrustSettings) -> Result<Self, BridgeError> {
        Self::new(TrustedOriginSet::from(settings))
    }

    /// Returns true when `origin` is an exact allow-listed origin or an
    /// `https` subdomain of a trusted root domain.
    pub fn is_trusted(&self, origin: &str) -> bool {
        if origin.is_empty() {
            return false;
        }
        self.exact.iter().any(|trusted| trusted == origin) || self.subdomains.is_match(origin)
    }
}

/// At least one label before the root, nothing after it. Root case folding
/// is ASCII-only so that `ſ` or the Kelvin sign never stand in for `s`/`k`.
fn subdomain_pattern(domain: &str) -> String {
    format!(
        r"^https://[a-zA-Z0-9.-]+\.(?i-u:{})$",
        regex::escape(domain)
    )
}

fn validate_exact_origin(origin: &str) -> Result<(), BridgeError> {
    let url = reqwest::Url::parse(origin).map_err(|e| {
        BridgeError::InvalidConfiguration(format!("Trusted origin '{}' is not a URL: {}", origin, e))
    })?;

    if url.origin().ascii_serialization() != origin {
        return Err(BridgeError::InvalidConfiguration(format!(
            "Trusted origin '{}' must be scheme://host[:port] with no path",
            origin
        )));
    }
    Ok(())
}

fn validate_root_domain(domain: &str) -> Result<(), BridgeError> {
    let well_formed = !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    if !well_formed {
        return Err(BridgeError::InvalidConfiguration(format!(
            "Trusted wildcard domain '{}' is not a valid domain",
            domain
        )));
    }
    Ok(())
}
