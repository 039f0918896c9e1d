use std::fmt;

use serde::{Deserialize, Serialize};

use crate::platform::{PlatformConstants, PlatformOs, ScreenDimensions};

const SEPARATOR: &str = "-";

/// Identifies one running app instance to the debugging server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build an identifier from device attributes alone.
///
/// Segments are `name`, OS, OS version, a platform discriminator (system
/// name on iOS, device model on Android), the screen dimension signature,
/// and the screen scale. Empty segments and a zero scale are dropped.
pub fn derive_ephemeral(
    name: &str,
    constants: &PlatformConstants,
    dimensions: &ScreenDimensions,
) -> ClientId {
    let discriminator = match constants.os {
        PlatformOs::Ios => constants.system_name.as_deref(),
        PlatformOs::Android => constants.model.as_deref(),
        PlatformOs::Other(_) => None,
    };
    let signature = dimension_signature(dimensions);
    let scale = dimensions
        .screen_scale
        .filter(|s| *s != 0.0 && !s.is_nan())
        .map(format_number);

    let segments = [
        Some(name),
        Some(constants.os.as_str()),
        constants.os_version.as_deref(),
        discriminator,
        Some(signature.as_str()),
        scale.as_deref(),
    ];
    let id = segments
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    ClientId(id)
}

/// Width and height rendered as text and sorted as text, so a rotated
/// screen yields the same signature.
pub fn dimension_signature(dimensions: &ScreenDimensions) -> String {
    let mut sides: Vec<String> = [dimensions.screen_width, dimensions.screen_height]
        .into_iter()
        .flatten()
        .map(format_number)
        .collect();
    sides.sort();
    sides.join(SEPARATOR)
}

/// Whole numbers print without a fractional part (`375`, not `375.0`).
fn format_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn iphone() -> PlatformConstants {
        PlatformConstants {
            os: PlatformOs::Ios,
            os_version: Some("17.2".into()),
            system_name: Some("iOS".into()),
            model: Some("iPhone".into()),
            ..PlatformConstants::default()
        }
    }

    fn pixel() -> PlatformConstants {
        PlatformConstants {
            os: PlatformOs::Android,
            os_version: Some("34".into()),
            system_name: Some("Android".into()),
            model: Some("Pixel 8".into()),
            ..PlatformConstants::default()
        }
    }

    #[test]
    fn test_ios_identifier_uses_system_name() {
        let id = derive_ephemeral("MyApp", &iphone(), &ScreenDimensions::uniform(375.0, 812.0, 3.0));
        assert_eq!(id.as_str(), "MyApp-ios-17.2-iOS-375-812-3");
    }

    #[test]
    fn test_android_identifier_uses_model() {
        let id = derive_ephemeral(
            "",
            &pixel(),
            &ScreenDimensions::uniform(411.42857142857144, 914.2857142857143, 2.625),
        );
        assert_eq!(
            id.as_str(),
            "android-34-Pixel 8-411.42857142857144-914.2857142857143-2.625"
        );
    }

    #[test]
    fn test_other_platforms_have_no_discriminator() {
        let constants = PlatformConstants {
            os: PlatformOs::Other("web".into()),
            os_version: Some("1".into()),
            model: Some("ignored".into()),
            ..PlatformConstants::default()
        };
        let id = derive_ephemeral("app", &constants, &ScreenDimensions::uniform(800.0, 600.0, 1.0));
        assert_eq!(id.as_str(), "app-web-1-600-800-1");
    }

    #[test]
    fn test_signature_is_rotation_invariant() {
        let portrait = ScreenDimensions::uniform(375.0, 812.0, 3.0);
        assert_eq!(dimension_signature(&portrait), "375-812");
        assert_eq!(dimension_signature(&portrait.rotated()), "375-812");
        assert_eq!(
            derive_ephemeral("a", &iphone(), &portrait),
            derive_ephemeral("a", &iphone(), &portrait.rotated())
        );
    }

    #[test]
    fn test_signature_sorts_as_text() {
        let dims = ScreenDimensions::uniform(720.0, 1080.0, 2.0);
        assert_eq!(dimension_signature(&dims), "1080-720");
    }

    #[test]
    fn test_missing_metadata_drops_segments() {
        let id = derive_ephemeral("app", &PlatformConstants::default(), &ScreenDimensions::default());
        assert_eq!(id.as_str(), "app");

        let partial = ScreenDimensions {
            screen_width: Some(320.0),
            screen_scale: Some(0.0),
            ..ScreenDimensions::default()
        };
        let id = derive_ephemeral("", &iphone(), &partial);
        assert_eq!(id.as_str(), "ios-17.2-iOS-320");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let dims = ScreenDimensions::uniform(390.0, 844.0, 3.0);
        assert_eq!(
            derive_ephemeral("x", &pixel(), &dims),
            derive_ephemeral("x", &pixel(), &dims)
        );
    }

    #[test]
    fn test_client_id_is_transparent_on_the_wire() {
        let id = ClientId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(ClientId::new("abc").into_inner(), "abc");
    }
}
