//! Platform and device metadata consumed by configuration and identity.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Operating system family the client runs on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlatformOs {
    Ios,
    Android,
    Other(String),
}

impl PlatformOs {
    pub fn as_str(&self) -> &str {
        match self {
            PlatformOs::Ios => "ios",
            PlatformOs::Android => "android",
            PlatformOs::Other(name) => name,
        }
    }

    /// The OS this binary was compiled for.
    pub fn current() -> Self {
        Self::from(std::env::consts::OS)
    }
}

impl Default for PlatformOs {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<&str> for PlatformOs {
    fn from(name: &str) -> Self {
        match name {
            "ios" => Self::Ios,
            "android" => Self::Android,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PlatformOs {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<PlatformOs> for String {
    fn from(os: PlatformOs) -> Self {
        os.as_str().to_string()
    }
}

impl fmt::Display for PlatformOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static facts about the device, read once at configuration time.
/// Anything the platform cannot tell us stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConstants {
    pub os: PlatformOs,
    pub os_version: Option<String>,
    pub os_release: Option<String>,
    pub model: Option<String>,
    pub server_host: Option<String>,
    pub force_touch: Option<bool>,
    pub interface_idiom: Option<String>,
    pub system_name: Option<String>,
    pub ui_mode: Option<String>,
    pub serial: Option<String>,
    pub runtime_version: Option<String>,
}

/// Window and screen geometry in logical units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenDimensions {
    pub window_width: Option<f64>,
    pub window_height: Option<f64>,
    pub window_scale: Option<f64>,
    pub window_font_scale: Option<f64>,
    pub screen_width: Option<f64>,
    pub screen_height: Option<f64>,
    pub screen_scale: Option<f64>,
    pub screen_font_scale: Option<f64>,
}

impl ScreenDimensions {
    /// Same geometry for window and screen.
    pub fn uniform(width: f64, height: f64, scale: f64) -> Self {
        Self {
            window_width: Some(width),
            window_height: Some(height),
            window_scale: Some(scale),
            window_font_scale: Some(1.0),
            screen_width: Some(width),
            screen_height: Some(height),
            screen_scale: Some(scale),
            screen_font_scale: Some(1.0),
        }
    }

    /// The same screen turned by 90 degrees.
    pub fn rotated(self) -> Self {
        Self {
            window_width: self.window_height,
            window_height: self.window_width,
            screen_width: self.screen_height,
            screen_height: self.screen_width,
            ..self
        }
    }
}

/// Source of device metadata. Implemented by the embedding application.
pub trait PlatformProvider: Send + Sync {
    fn constants(&self) -> PlatformConstants;

    /// Current geometry. May change between calls, e.g. on rotation.
    fn dimensions(&self) -> ScreenDimensions;

    /// Where the running code was loaded from, typically a URL served by a
    /// development host.
    fn script_url(&self) -> Result<String, PlatformError>;
}

/// Fixed metadata, with geometry that can be updated at runtime.
#[derive(Debug, Default)]
pub struct StaticPlatform {
    constants: PlatformConstants,
    dimensions: RwLock<ScreenDimensions>,
    script_url: Option<String>,
}

impl StaticPlatform {
    pub fn new(constants: PlatformConstants, dimensions: ScreenDimensions) -> Self {
        Self {
            constants,
            dimensions: RwLock::new(dimensions),
            script_url: None,
        }
    }

    pub fn with_script_url(mut self, url: &str) -> Self {
        self.script_url = Some(url.to_string());
        self
    }

    pub fn set_dimensions(&self, dimensions: ScreenDimensions) {
        *self
            .dimensions
            .write()
            .unwrap_or_else(PoisonError::into_inner) = dimensions;
    }
}

impl PlatformProvider for StaticPlatform {
    fn constants(&self) -> PlatformConstants {
        self.constants.clone()
    }

    fn dimensions(&self) -> ScreenDimensions {
        *self.dimensions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn script_url(&self) -> Result<String, PlatformError> {
        self.script_url
            .clone()
            .ok_or_else(|| PlatformError::Unavailable("no script url configured".into()))
    }
}

/// Metadata for a plain host process, read from the running OS.
/// There is no screen and no script url.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostPlatform;

impl PlatformProvider for HostPlatform {
    fn constants(&self) -> PlatformConstants {
        let info = os_info::get();
        PlatformConstants {
            os: PlatformOs::current(),
            os_version: Some(info.version().to_string()),
            os_release: info.edition().map(str::to_string),
            model: info.architecture().map(str::to_string),
            system_name: Some(info.os_type().to_string()),
            ..PlatformConstants::default()
        }
    }

    fn dimensions(&self) -> ScreenDimensions {
        ScreenDimensions::default()
    }

    fn script_url(&self) -> Result<String, PlatformError> {
        Err(PlatformError::Unavailable(
            "host processes are not loaded from a script url".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_platform_os_names() {
        assert_eq!(PlatformOs::from("ios"), PlatformOs::Ios);
        assert_eq!(PlatformOs::from("android"), PlatformOs::Android);
        assert_eq!(PlatformOs::from("web"), PlatformOs::Other("web".into()));
        assert_eq!(PlatformOs::Android.to_string(), "android");
        assert_eq!(PlatformOs::default().as_str(), "");
    }

    #[test]
    fn test_platform_os_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlatformOs::Ios).unwrap();
        assert_eq!(json, "\"ios\"");

        let parsed: PlatformOs = serde_json::from_str("\"windows\"").unwrap();
        assert_eq!(parsed, PlatformOs::Other("windows".into()));
    }

    #[test]
    fn test_rotation_swaps_both_geometries() {
        let portrait = ScreenDimensions::uniform(375.0, 812.0, 3.0);
        let landscape = portrait.rotated();
        assert_eq!(landscape.screen_width, Some(812.0));
        assert_eq!(landscape.screen_height, Some(375.0));
        assert_eq!(landscape.window_width, Some(812.0));
        assert_eq!(landscape.screen_scale, Some(3.0));
        assert_eq!(landscape.rotated(), portrait);
    }

    #[test]
    fn test_static_platform_updates_dimensions() {
        let platform = StaticPlatform::new(
            PlatformConstants::default(),
            ScreenDimensions::uniform(1.0, 2.0, 1.0),
        );
        assert!(platform.script_url().is_err());

        platform.set_dimensions(ScreenDimensions::uniform(3.0, 4.0, 2.0));
        assert_eq!(platform.dimensions().screen_width, Some(3.0));

        let platform = platform.with_script_url("http://10.0.2.2:8081/index.bundle");
        assert_eq!(
            platform.script_url().unwrap(),
            "http://10.0.2.2:8081/index.bundle"
        );
    }

    #[test]
    fn test_host_platform_has_no_screen() {
        let platform = HostPlatform;
        assert_eq!(platform.dimensions(), ScreenDimensions::default());
        assert!(matches!(
            platform.script_url(),
            Err(PlatformError::Unavailable(_))
        ));
        assert_eq!(platform.constants().os, PlatformOs::current());
    }

    #[test]
    fn test_constants_wire_names() {
        let constants = PlatformConstants {
            os: PlatformOs::Android,
            os_version: Some("34".into()),
            ui_mode: Some("normal".into()),
            ..PlatformConstants::default()
        };
        let value = serde_json::to_value(&constants).unwrap();
        assert_eq!(value["os"], "android");
        assert_eq!(value["osVersion"], "34");
        assert_eq!(value["uiMode"], "normal");
    }
}
