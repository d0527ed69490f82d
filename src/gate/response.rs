//! Gate response validation.
//!
//! A trusted response is exactly `<token>#<url>`. Anything else fails closed:
//! the caller shows the native app and nothing is persisted.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::FormatError;

pub const SEGMENT_DELIMITER: char = '#';

/// The validated outcome of one gate round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "url", rename_all = "snake_case")]
pub enum GateDecision {
    Redirect(String),
    ShowNative,
}

impl GateDecision {
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            GateDecision::Redirect(url) => Some(url),
            GateDecision::ShowNative => None,
        }
    }
}

/// Split `raw` on `#` and check the token.
///
/// The URL segment is returned verbatim; scheme and host are not inspected here.
/// See [`crate::gate::UrlPolicy`] for the optional allow-list.
pub fn validate(raw: &str, expected_token: &str) -> Result<GateDecision, FormatError> {
    let segments: Vec<&str> = raw.split(SEGMENT_DELIMITER).collect();
    if segments.len() != 2 {
        return Err(FormatError::BadSegmentCount {
            found: segments.len(),
        });
    }

    if segments[0].as_bytes() != expected_token.as_bytes() {
        return Err(FormatError::BadToken);
    }

    Ok(GateDecision::Redirect(segments[1].to_string()))
}

/// [`validate`], failing closed to [`GateDecision::ShowNative`].
pub fn resolve(raw: &str, expected_token: &str) -> GateDecision {
    match validate(raw, expected_token) {
        Ok(decision) => decision,
        Err(reason) => {
            warn!(%reason, "Untrusted gate response, showing native app");
            GateDecision::ShowNative
        }
    }
}
