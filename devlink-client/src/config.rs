use std::fmt;

use devlink_identity::{PlatformConstants, PlatformOs, PlatformProvider, ScreenDimensions};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::default_host;
use crate::transport::SocketFactory;

pub const DEFAULT_PORT: u16 = 9090;
pub const DEFAULT_NAME: &str = "Rust App";
pub const LIBRARY_NAME: &str = "devlink-client";
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overrides the environment tag sent in the intro.
pub const ENVIRONMENT_VAR: &str = "DEVLINK_ENV";

/// Device and library facts announced to the server on connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub library_name: String,
    pub library_version: String,
    pub platform: PlatformOs,
    pub platform_version: Option<String>,
    pub os_release: Option<String>,
    pub model: Option<String>,
    pub server_host: Option<String>,
    pub force_touch: Option<bool>,
    pub interface_idiom: Option<String>,
    pub system_name: Option<String>,
    pub ui_mode: Option<String>,
    pub serial: Option<String>,
    pub runtime_version: Option<String>,
    #[serde(flatten)]
    pub dimensions: ScreenDimensions,
}

impl ClientInfo {
    pub fn from_platform(constants: PlatformConstants, dimensions: ScreenDimensions) -> Self {
        Self {
            library_name: LIBRARY_NAME.to_string(),
            library_version: LIBRARY_VERSION.to_string(),
            platform: constants.os,
            platform_version: constants.os_version,
            os_release: constants.os_release,
            model: constants.model,
            server_host: constants.server_host,
            force_touch: constants.force_touch,
            interface_idiom: constants.interface_idiom,
            system_name: constants.system_name,
            ui_mode: constants.ui_mode,
            serial: constants.serial,
            runtime_version: constants.runtime_version,
            dimensions,
        }
    }
}

/// Caller-supplied settings layered over the platform defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub environment: Option<String>,
    pub secure: Option<bool>,
}

impl ClientOverrides {
    /// Parse overrides from TOML, e.g. the `[devlink]` table of an app's
    /// settings file already extracted as text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Client configuration. Fixed once the client is built.
#[derive(Clone, Serialize)]
pub struct ClientConfig {
    #[serde(skip)]
    pub socket_factory: Option<SocketFactory>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub environment: String,
    pub secure: bool,
    pub client: ClientInfo,
}

impl ClientConfig {
    /// Defaults read from `platform`, with `overrides` applied on top.
    ///
    /// The script origin is only consulted when no host override is given.
    pub fn from_platform(platform: &dyn PlatformProvider, overrides: ClientOverrides) -> Self {
        let ClientOverrides {
            host,
            port,
            name,
            environment,
            secure,
        } = overrides;
        Self {
            socket_factory: None,
            host: host.unwrap_or_else(|| default_host(platform)),
            port: port.unwrap_or(DEFAULT_PORT),
            name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            environment: environment.unwrap_or_else(default_environment),
            secure: secure.unwrap_or(false),
            client: ClientInfo::from_platform(platform.constants(), platform.dimensions()),
        }
    }

    pub fn with_socket_factory(mut self, factory: SocketFactory) -> Self {
        self.socket_factory = Some(factory);
        self
    }

    /// Websocket address of the debugging server.
    pub fn url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("socket_factory", &self.socket_factory.is_some())
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("environment", &self.environment)
            .field("secure", &self.secure)
            .field("client", &self.client)
            .finish()
    }
}

pub fn default_environment() -> String {
    std::env::var(ENVIRONMENT_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| {
            if cfg!(debug_assertions) {
                "development".to_string()
            } else {
                "production".to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use devlink_identity::StaticPlatform;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::ClientError;

    fn android() -> StaticPlatform {
        StaticPlatform::new(
            PlatformConstants {
                os: PlatformOs::Android,
                os_version: Some("34".into()),
                model: Some("Pixel 8".into()),
                ..PlatformConstants::default()
            },
            ScreenDimensions::uniform(412.0, 915.0, 2.625),
        )
        .with_script_url("http://10.0.2.2:8081/index.bundle?platform=android")
    }

    #[test]
    fn test_defaults_from_platform() {
        let config = ClientConfig::from_platform(&android(), ClientOverrides::default());
        assert_eq!(config.host, "10.0.2.2");
        assert_eq!(config.port, 9090);
        assert_eq!(config.name, "Rust App");
        assert!(!config.secure);
        assert_eq!(config.url(), "ws://10.0.2.2:9090");
        assert_eq!(config.client.platform, PlatformOs::Android);
        assert_eq!(config.client.model.as_deref(), Some("Pixel 8"));
        assert_eq!(config.client.library_name, LIBRARY_NAME);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ClientOverrides::from_toml_str(
            r#"
            host = "debug.local"
            port = 9091
            name = "Checkout"
            environment = "staging"
            secure = true
            "#,
        )
        .unwrap();
        let config = ClientConfig::from_platform(&android(), overrides);
        assert_eq!(config.url(), "wss://debug.local:9091");
        assert_eq!(config.name, "Checkout");
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn test_partial_and_bad_overrides() {
        let partial = ClientOverrides::from_toml_str("port = 1234").unwrap();
        assert_eq!(
            partial,
            ClientOverrides {
                port: Some(1234),
                ..ClientOverrides::default()
            }
        );

        let err = ClientOverrides::from_toml_str("hots = \"typo\"").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_client_info_flattens_dimensions() {
        let config = ClientConfig::from_platform(&android(), ClientOverrides::default());
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["client"]["windowWidth"], json!(412.0));
        assert_eq!(value["client"]["platform"], json!("android"));
        assert_eq!(value["client"]["platformVersion"], json!("34"));
        assert!(value.get("socketFactory").is_none());
        assert!(value.get("socket_factory").is_none());
    }
}
