//! Optional file configuration, merged under CLI flags.
//!
//! Looked up at `~/.chama-chat/config.toml`; every field is optional and
//! a missing or unreadable file just yields the defaults.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::session::DEFAULT_SECTION;

/// Production webhook endpoint of the consultation workflow.
pub const DEFAULT_WEBHOOK_URL: &str =
    "https://n8n.mwbpdo.easypanel.host/webhook/37fee2b8-456f-414c-8ffe-5c64b4a11b68";

/// Default bound on one gateway round-trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub webhook_url: Option<String>,
    pub section: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Read a config file, falling back to defaults on any failure.
    pub fn from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Resolved request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Merge CLI overrides over the file values and fill in defaults,
    /// consuming the config in one step.
    pub fn resolve(self, url: Option<String>, section: Option<String>) -> Settings {
        let request_timeout = self.request_timeout();
        Settings {
            webhook_url: url
                .or(self.webhook_url)
                .unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string()),
            section: section
                .or(self.section)
                .unwrap_or_else(|| DEFAULT_SECTION.to_string()),
            request_timeout,
        }
    }
}

/// Final settings the binary runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub webhook_url: String,
    pub section: String,
    pub request_timeout: Duration,
}

/// Load the user's config file, if any.
pub fn load() -> Config {
    home::home_dir()
        .map(|mut p| {
            p.push(".chama-chat");
            p.push("config.toml");
            p
        })
        .map(|p| Config::from_path(&p))
        .unwrap_or_default()
}
