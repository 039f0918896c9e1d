use std::sync::Arc;

use devlink_identity::PlatformProvider;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::client::DevClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

static CLIENT: OnceCell<Arc<DevClient>> = OnceCell::new();

/// Install the process-wide client. Only the first call succeeds.
pub fn init(config: ClientConfig, platform: Arc<dyn PlatformProvider>) -> Result<Arc<DevClient>> {
    let client = Arc::new(DevClient::new(config, platform));
    CLIENT
        .set(Arc::clone(&client))
        .map_err(|_| ClientError::AlreadyInitialised)?;
    info!(name = %client.config().name, "process-wide client installed");
    Ok(client)
}

/// The process-wide client, if [`init`] has run.
pub fn global() -> Option<Arc<DevClient>> {
    CLIENT.get().cloned()
}

#[cfg(test)]
mod tests {
    use devlink_identity::{PlatformConstants, ScreenDimensions, StaticPlatform};

    use super::*;
    use crate::config::ClientOverrides;

    // The only test in this crate that touches the global.
    #[test]
    fn test_init_once() {
        let platform = Arc::new(StaticPlatform::new(
            PlatformConstants::default(),
            ScreenDimensions::default(),
        ));
        let overrides = ClientOverrides {
            host: Some("localhost".into()),
            ..ClientOverrides::default()
        };
        let config = ClientConfig::from_platform(platform.as_ref(), overrides);

        assert!(global().is_none());
        let first = init(config.clone(), platform.clone()).unwrap();
        assert!(Arc::ptr_eq(&first, &global().unwrap()));
        assert!(matches!(
            init(config, platform),
            Err(ClientError::AlreadyInitialised)
        ));
    }
}
