/// Errors produced while activating plugins or invoking their features.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("invalid config for plugin '{plugin}': {reason}")]
    InvalidConfig { plugin: String, reason: String },

    #[error("feature '{0}' is not a method")]
    NotAMethod(String),

    #[error("bad arguments for '{method}': {reason}")]
    BadArguments { method: String, reason: String },
}

impl PluginError {
    pub fn invalid_config(plugin: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidConfig {
            plugin: plugin.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
