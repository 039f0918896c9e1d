//! Client side of the devlink remote-debugging protocol.
//!
//! A [`DevClient`] is built from a [`ClientConfig`], extended with plugins
//! (individually through [`DevClient::use_plugin`] or all at once through
//! [`DevClient::use_defaults`]), and then connected to the debugging server.

pub mod client;
pub mod config;
pub mod defaults;
pub mod error;
mod global;
pub mod host;
pub mod outbox;
pub mod transport;

pub use client::DevClient;
pub use config::{ClientConfig, ClientInfo, ClientOverrides, DEFAULT_NAME, DEFAULT_PORT};
pub use defaults::{DefaultPluginOptions, NoOptions, PluginToggle, core_plugins};
pub use error::{ClientError, Result};
pub use global::{global, init};
pub use host::{DEFAULT_HOST, HostError, default_host, host_from_url, resolve_host};
pub use transport::{Frame, Socket, SocketFactory, TransportError, channel_transport};

pub use devlink_identity as identity;
pub use devlink_plugin as plugin;
pub use devlink_plugins as plugins;
