//! Outbound gate request assembly.
//!
//! The request is the compiled-in endpoint with five parameters merged into its
//! existing query: same-named parameters are overwritten in place, unrelated
//! ones are kept in their original order.

use reqwest::Url;

use crate::device::{DeviceProfile, country_code, language_code};
use crate::errors::GateError;

pub const PARAM_ACCESS_CODE: &str = "p";
pub const PARAM_OS: &str = "os";
pub const PARAM_LANGUAGE: &str = "lng";
pub const PARAM_DEVICE_MODEL: &str = "devicemodel";
pub const PARAM_COUNTRY: &str = "country";

/// The five parameters carried by every gate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    pub access_code: String,
    /// `"<OS name> <OS version>"`
    pub os: String,
    pub language: String,
    pub device_model: String,
    pub country: String,
}

impl GateRequest {
    /// Build from raw inputs. `locale` and `country` degrade to `"en"` / `"US"`.
    pub fn new(
        access_code: &str,
        locale: Option<&str>,
        country: Option<&str>,
        os_name: &str,
        os_version: &str,
        device_model: &str,
    ) -> Self {
        Self {
            access_code: access_code.to_string(),
            os: format!("{} {}", os_name, os_version),
            language: language_code(locale),
            device_model: device_model.to_string(),
            country: country_code(country),
        }
    }

    pub fn from_profile(access_code: &str, profile: &DeviceProfile) -> Self {
        Self::new(
            access_code,
            profile.locale.as_deref(),
            profile.country.as_deref(),
            &profile.os_name,
            &profile.os_version,
            &profile.model,
        )
    }

    /// Parameters in wire order.
    pub fn params(&self) -> [(&'static str, &str); 5] {
        [
            (PARAM_ACCESS_CODE, self.access_code.as_str()),
            (PARAM_OS, self.os.as_str()),
            (PARAM_LANGUAGE, self.language.as_str()),
            (PARAM_DEVICE_MODEL, self.device_model.as_str()),
            (PARAM_COUNTRY, self.country.as_str()),
        ]
    }

    /// Merge the parameters into `base`'s query.
    pub fn apply_to(&self, base: &Url) -> Url {
        merge_query(base, &self.params())
    }
}

/// Parse the endpoint and merge the request into it.
///
/// Fails only when `endpoint` itself is not an absolute URL.
pub fn build_request(endpoint: &str, request: &GateRequest) -> Result<Url, GateError> {
    let base = parse_endpoint(endpoint)?;
    Ok(request.apply_to(&base))
}

pub fn parse_endpoint(endpoint: &str) -> Result<Url, GateError> {
    let url = Url::parse(endpoint).map_err(|e| GateError::Config {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(GateError::Config {
            endpoint: endpoint.to_string(),
            reason: "endpoint cannot carry a query".to_string(),
        });
    }
    Ok(url)
}

/// Upsert each `(name, value)` into the query of `base`.
///
/// The first occurrence of a name takes the new value and any later
/// duplicates of that name are dropped, so every merged name appears once.
pub fn merge_query(base: &Url, params: &[(&str, &str)]) -> Url {
    let mut pairs: Vec<(String, String)> = base.query_pairs().into_owned().collect();

    for (name, value) in params {
        match pairs.iter().position(|(n, _)| n == name) {
            Some(index) => {
                pairs[index].1 = value.to_string();
                let mut seen = false;
                pairs.retain(|(n, _)| {
                    if n != name {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => pairs.push((name.to_string(), value.to_string())),
        }
    }

    let mut url = base.clone();
    url.set_query(None);
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs.iter());
    }
    url
}
