use devlink_identity::IdentityError;
use devlink_plugin::PluginError;

use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// `connect` was called without a socket factory in the configuration.
    #[error("no socket factory configured")]
    NoTransport,

    #[error("not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error("malformed command: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("client already initialised")]
    AlreadyInitialised,
}

pub type Result<T> = std::result::Result<T, ClientError>;
