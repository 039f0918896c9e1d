//! Connection host discovery from the script origin.

use std::fmt::Display;

use devlink_identity::{PlatformError, PlatformProvider};
use tracing::warn;
use url::Url;

/// Host used when nothing better can be discovered.
pub const DEFAULT_HOST: &str = "localhost";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("url {0:?} has no host")]
    MissingHost(String),
}

/// Host component of `origin`: a name, an IPv4 address, or a bracketed
/// IPv6 address. Scheme, port, and path are dropped.
pub fn host_from_url(origin: &str) -> Result<String, HostError> {
    let url = Url::parse(origin).map_err(|e| HostError::InvalidUrl {
        url: origin.to_string(),
        reason: e.to_string(),
    })?;
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .ok_or_else(|| HostError::MissingHost(origin.to_string()))
}

/// Host of the script origin, or `fallback` when there is no usable one.
///
/// Never fails. Every fallback is reported with a single warning.
pub fn resolve_host(script_origin: Option<&str>, fallback: &str) -> String {
    match script_origin {
        Some(origin) => match host_from_url(origin) {
            Ok(host) => host,
            Err(e) => fall_back(&e, fallback),
        },
        None => fall_back(
            &PlatformError::NotAString("script origin".into()),
            fallback,
        ),
    }
}

/// The host the platform's script was served from, else [`DEFAULT_HOST`].
pub fn default_host(platform: &dyn PlatformProvider) -> String {
    match platform.script_url() {
        Ok(origin) => resolve_host(Some(&origin), DEFAULT_HOST),
        Err(e) => fall_back(&e, DEFAULT_HOST),
    }
}

fn fall_back(reason: &dyn Display, fallback: &str) -> String {
    warn!(%reason, fallback, "could not resolve host from script origin, falling back");
    fallback.to_string()
}
