//! Device and locale metadata sent with every gate request.

use serde::Serialize;

use crate::gate_config::DeviceSection;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_COUNTRY: &str = "US";

/// Metadata describing the device the gate is running on.
///
/// Detected once per process; treated as static for the lifetime of a launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceProfile {
    pub os_name: String,
    pub os_version: String,
    /// Preferred locale tag, e.g. `fr-CA` or `en_US.UTF-8`
    pub locale: Option<String>,
    /// Region code, if one could be determined
    pub country: Option<String>,
    pub model: String,
}

impl DeviceProfile {
    /// Detect from the host, then apply any configured overrides.
    pub fn detect(overrides: &DeviceSection) -> Self {
        let locale = overrides.locale.clone().or_else(detect_locale);
        let country = overrides
            .country
            .clone()
            .or_else(|| locale.as_deref().and_then(region_code));

        Self {
            os_name: overrides.os_name.clone().unwrap_or_else(platform_name),
            os_version: overrides
                .os_version
                .clone()
                .or_else(detect_os_version)
                .unwrap_or_else(|| "unknown".to_string()),
            locale,
            country,
            model: overrides
                .model
                .clone()
                .unwrap_or_else(|| std::env::consts::ARCH.to_string()),
        }
    }

    /// `"<platform name> <platform version>"`, e.g. `"iOS 17.4"`.
    pub fn os_label(&self) -> String {
        format!("{} {}", self.os_name, self.os_version)
    }

    pub fn language(&self) -> String {
        language_code(self.locale.as_deref())
    }

    pub fn country_code(&self) -> String {
        country_code(self.country.as_deref())
    }
}

/// Language prefix of a locale tag: `"pt-BR"` → `"pt"`, `"de_DE.UTF-8"` → `"de"`.
/// Empty or absent tags degrade to `"en"`.
pub fn language_code(locale: Option<&str>) -> String {
    locale
        .map(strip_encoding)
        .and_then(|tag| tag.split(['-', '_']).next())
        .map(|lang| lang.trim().to_lowercase())
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Upper-cased region code, `"US"` when absent or empty.
pub fn country_code(country: Option<&str>) -> String {
    country
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string())
}

/// Region segment of a locale tag, if it has one: `"en_GB.UTF-8"` → `"GB"`.
pub fn region_code(locale: &str) -> Option<String> {
    strip_encoding(locale)
        .split(['-', '_'])
        .skip(1)
        .find(|seg| seg.len() == 2 && seg.chars().all(|c| c.is_ascii_alphabetic()))
        .map(|seg| seg.to_uppercase())
}

fn strip_encoding(tag: &str) -> &str {
    tag.split(['.', '@']).next().unwrap_or(tag)
}

fn detect_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| {
            let tag = strip_encoding(value);
            !tag.is_empty() && tag != "C" && tag != "POSIX"
        })
}

fn platform_name() -> String {
    match std::env::consts::OS {
        "macos" => "macOS",
        "ios" => "iOS",
        "linux" => "Linux",
        "windows" => "Windows",
        "android" => "Android",
        other => other,
    }
    .to_string()
}

fn detect_os_version() -> Option<String> {
    if cfg!(target_os = "linux") {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        parse_os_release_version(&content)
    } else {
        None
    }
}

fn parse_os_release_version(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("VERSION_ID="))
        .map(|v| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}
