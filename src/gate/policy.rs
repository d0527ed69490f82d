//! Optional allow-list for redirect URLs.
//!
//! Validation trusts any payload that follows a correct token. When enabled,
//! this layer additionally requires the payload to parse as an absolute URL
//! with an allowed scheme and, if hosts are listed, an allowed host.

use reqwest::Url;
use thiserror::Error;

use crate::gate_config::PolicySection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("redirect is not an absolute URL: {0}")]
    Unparseable(String),

    #[error("scheme '{0}' is not allowed")]
    Scheme(String),

    #[error("host '{0}' is not allowed")]
    Host(String),
}

#[derive(Debug, Clone, Default)]
pub struct UrlPolicy {
    enabled: bool,
    allowed_schemes: Vec<String>,
    allowed_hosts: Vec<String>,
}

impl UrlPolicy {
    /// A policy that accepts every payload.
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn from_config(section: &PolicySection) -> Self {
        Self {
            enabled: section.enabled,
            allowed_schemes: section
                .allowed_schemes
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            allowed_hosts: section
                .allowed_hosts
                .iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn check(&self, redirect: &str) -> Result<(), PolicyViolation> {
        if !self.enabled {
            return Ok(());
        }

        let url =
            Url::parse(redirect).map_err(|_| PolicyViolation::Unparseable(redirect.to_string()))?;

        if !self.allowed_schemes.iter().any(|s| s == url.scheme()) {
            return Err(PolicyViolation::Scheme(url.scheme().to_string()));
        }

        if !self.allowed_hosts.is_empty() {
            let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
            if !self.allowed_hosts.contains(&host) {
                return Err(PolicyViolation::Host(host));
            }
        }

        Ok(())
    }
}
