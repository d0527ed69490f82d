//! One request/response cycle against the remote gate.

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

use crate::device::DeviceProfile;
use crate::errors::{FormatError, GateError};
use crate::gate::request::{GateRequest, parse_endpoint};
use crate::gate::response::{self, GateDecision};

/// Abstraction over the network call for testability.
/// Real implementation: `HttpTransport`. Test doubles live next to the controller tests.
#[async_trait]
pub trait GateTransport: Send + Sync {
    /// Issue a single, non-retrying GET and return the body as text.
    ///
    /// Any HTTP status with a UTF-8 body is a success: the payload, not the
    /// status line, is authoritative.
    async fn fetch(&self, url: &Url) -> Result<String, GateError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, GateError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl GateTransport for HttpTransport {
    async fn fetch(&self, url: &Url) -> Result<String, GateError> {
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| GateError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| GateError::Network(format!("failed to read body: {}", e)))?;
        debug!(%status, bytes = body.len(), "Gate responded");

        String::from_utf8(body.to_vec())
            .map_err(|_| GateError::Network("response body is not valid UTF-8".to_string()))
    }
}

/// Builds, sends and validates gate requests.
pub struct GateClient<T: GateTransport = HttpTransport> {
    endpoint: Url,
    request: GateRequest,
    token: String,
    transport: T,
}

impl<T: GateTransport> GateClient<T> {
    /// Fails with [`GateError::Config`] if `endpoint` is malformed.
    pub fn new(
        endpoint: &str,
        access_code: &str,
        token: &str,
        device: &DeviceProfile,
        transport: T,
    ) -> Result<Self, GateError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            request: GateRequest::from_profile(access_code, device),
            token: token.to_string(),
            transport,
        })
    }

    pub fn request(&self) -> &GateRequest {
        &self.request
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The full request URL. Rebuilt on every call; identical for identical inputs.
    pub fn build_request(&self) -> Url {
        self.request.apply_to(&self.endpoint)
    }

    pub async fn send(&self, url: &Url) -> Result<String, GateError> {
        debug!(url = %url, "Sending gate request");
        self.transport.fetch(url).await
    }

    pub fn validate(&self, raw: &str) -> Result<GateDecision, FormatError> {
        response::validate(raw, &self.token)
    }

    /// Build → send → validate. Untrusted responses resolve to
    /// [`GateDecision::ShowNative`]; only transport failures are errors.
    pub async fn check(&self) -> Result<GateDecision, GateError> {
        let url = self.build_request();
        let raw = self.send(&url).await?;
        debug!(raw = %truncate(&raw, 256), "Raw gate response");

        let decision = response::resolve(&raw, &self.token);
        info!(
            redirect = decision.redirect_url().is_some(),
            "Gate answered"
        );
        Ok(decision)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
