use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use devlink_identity::{ClientId, IdentityManager, IdentityStore, PlatformProvider};
use devlink_plugin::{
    ActivationSummary, Command, CommandSink, Feature, LifecycleTracker, Plugin, PluginContext,
    PluginRegistry, PluginState, Surface, command_types,
};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::outbox::Outbox;

/// The debugging client.
///
/// Plugins are activated with [`DevClient::use_plugin`] during startup and
/// stay active for the life of the client. Plugin hooks run while the
/// client holds its registry lock, so a hook must not call back into
/// `use_plugin`.
pub struct DevClient {
    config: ClientConfig,
    identity: IdentityManager,
    outbox: Arc<Outbox>,
    context: PluginContext,
    plugins: Mutex<PluginRegistry>,
    surface: RwLock<Surface>,
    lifecycle: Mutex<LifecycleTracker>,
}

impl DevClient {
    pub fn new(config: ClientConfig, platform: Arc<dyn PlatformProvider>) -> Self {
        let outbox = Arc::new(Outbox::new());
        let snapshot = serde_json::to_value(&config).unwrap_or_else(|e| {
            warn!(error = %e, "could not snapshot configuration for plugins");
            Value::Null
        });
        let context = PluginContext::new(Arc::clone(&outbox) as Arc<dyn CommandSink>, snapshot);

        Self {
            config,
            identity: IdentityManager::new(platform),
            outbox,
            context,
            plugins: Mutex::new(PluginRegistry::new()),
            surface: RwLock::new(Surface::new()),
            lifecycle: Mutex::new(LifecycleTracker::new()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Activate `plugin` and merge what it contributes into the surface.
    ///
    /// On error the plugin is not recorded and nothing is merged.
    pub fn use_plugin<P: Plugin + 'static>(&self, plugin: P) -> Result<&Self> {
        self.use_boxed(Box::new(plugin))
    }

    pub fn use_boxed(&self, mut plugin: Box<dyn Plugin>) -> Result<&Self> {
        let name = plugin.name().to_string();
        let features = match plugin.on_activate(&self.context) {
            Ok(features) => features,
            Err(e) => {
                warn!(plugin = %name, error = %e, "plugin activation failed");
                self.lock_lifecycle().fail(&name, &e.to_string());
                return Err(e.into());
            }
        };

        let contributed = features.names();
        let shadowed = self.write_surface().merge(features);
        if !shadowed.is_empty() {
            debug!(plugin = %name, ?shadowed, "plugin replaced existing features");
        }
        self.lock_plugins().record(plugin, contributed);
        self.lock_lifecycle().transition(&name, PluginState::Active);
        info!(plugin = %name, "plugin activated");
        Ok(self)
    }

    pub fn plugin_names(&self) -> Vec<String> {
        self.lock_plugins()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Every activation in order, with the configuration it was given.
    pub fn activations(&self) -> Vec<ActivationSummary> {
        self.lock_plugins().summaries()
    }

    pub fn plugin_state(&self, name: &str) -> PluginState {
        self.lock_lifecycle().state_of(name)
    }

    /// Why the last activation of `name` failed, if it did.
    pub fn plugin_failure(&self, name: &str) -> Option<String> {
        self.lock_lifecycle().last_error(name).map(str::to_string)
    }

    // Identity.

    /// Register durable storage for the client identifier. Takes effect
    /// for every identity operation that starts afterwards.
    pub fn set_identity_store(&self, store: Arc<dyn IdentityStore>) -> &Self {
        self.identity.set_identity_store(store);
        self
    }

    pub async fn get_client_id(&self) -> Result<Option<ClientId>> {
        Ok(self.identity.get_client_id(&self.config.name).await?)
    }

    pub async fn set_client_id(&self, id: &ClientId) -> Result<()> {
        Ok(self.identity.set_client_id(id).await?)
    }

    pub fn identity(&self) -> &IdentityManager {
        &self.identity
    }

    // Feature surface.

    pub fn feature(&self, name: &str) -> Option<Feature> {
        self.read_surface().get(name).cloned()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.read_surface().names()
    }

    pub fn extension<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.read_surface().extension::<T>()
    }

    /// Invoke a method contributed by a plugin.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let method = self
            .read_surface()
            .method(name)
            .ok_or_else(|| ClientError::UnknownFeature(name.to_string()))??;
        Ok(method(&self.context, args)?)
    }

    // Connection.

    /// Open the socket, announce the client, and flush queued commands.
    ///
    /// Fails with [`ClientError::AlreadyConnected`] while a socket is open;
    /// call [`DevClient::disconnect`] first to reconnect.
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Err(ClientError::AlreadyConnected);
        }
        let factory = self
            .config
            .socket_factory
            .clone()
            .ok_or(ClientError::NoTransport)?;
        let client_id = self.get_client_id().await?;

        let address = self.config.url();
        let socket = factory(&address)?;
        let intro = Command::new(command_types::CLIENT_INTRO, self.intro_payload(client_id.as_ref()));
        let flushed = self.outbox.open(socket, intro)?;
        info!(%address, flushed, "connected");

        let mut plugins = self.lock_plugins();
        plugins.connect_all(&self.context);
        let mut lifecycle = self.lock_lifecycle();
        for name in plugins.names() {
            lifecycle.transition(name, PluginState::Connected);
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.outbox.is_connected()
    }

    /// Close the socket. Commands sent afterwards are queued again.
    pub fn disconnect(&self) -> Result<()> {
        let mut socket = self.outbox.detach().ok_or(ClientError::NotConnected)?;
        socket.close();
        info!("disconnected");

        let mut plugins = self.lock_plugins();
        plugins.disconnect_all(&self.context);
        let mut lifecycle = self.lock_lifecycle();
        for name in plugins.names() {
            lifecycle.transition(name, PluginState::Disconnected);
        }
        Ok(())
    }

    /// Disconnect if needed, then deactivate every plugin, newest first.
    pub fn shutdown(&self) {
        match self.disconnect() {
            Ok(()) | Err(ClientError::NotConnected) => {}
            Err(e) => warn!(error = %e, "disconnect during shutdown failed"),
        }
        let mut plugins = self.lock_plugins();
        plugins.deactivate_all(&self.context);
        let mut lifecycle = self.lock_lifecycle();
        for name in plugins.names() {
            lifecycle.transition(name, PluginState::Deactivated);
        }
        info!(plugins = plugins.len(), "client shut down");
    }

    // Commands.

    pub fn send(&self, command_type: &str, payload: Value, important: bool) {
        self.outbox
            .send(Command::new(command_type, payload).important(important));
    }

    pub fn display(&self, name: &str, value: Value, preview: Option<&str>) {
        let mut payload = json!({ "name": name, "value": value });
        if let Some(preview) = preview {
            payload["preview"] = Value::from(preview);
        }
        self.send(command_types::DISPLAY, payload, false);
    }

    pub fn queued(&self) -> usize {
        self.outbox.queued()
    }

    /// Handle one inbound frame from the server. Returns the names of the
    /// plugins the command was dispatched to.
    pub async fn receive(&self, raw: &str) -> Result<Vec<String>> {
        let command: Command = serde_json::from_str(raw)?;
        if command.command_type == command_types::SET_CLIENT_ID {
            match command.payload.as_str() {
                Some(id) => self.set_client_id(&ClientId::from(id)).await?,
                None => warn!(payload = %command.payload, "setClientId without a string payload"),
            }
        }
        Ok(self.lock_plugins().dispatch(&command, &self.context))
    }

    fn intro_payload(&self, client_id: Option<&ClientId>) -> Value {
        let mut payload = match serde_json::to_value(&self.config.client) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        payload.insert("environment".into(), Value::from(self.config.environment.as_str()));
        payload.insert("name".into(), Value::from(self.config.name.as_str()));
        payload.insert(
            "clientId".into(),
            client_id.map_or(Value::Null, |id| Value::from(id.as_str())),
        );
        Value::Object(payload)
    }

    fn lock_plugins(&self) -> MutexGuard<'_, PluginRegistry> {
        self.plugins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, LifecycleTracker> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_surface(&self) -> std::sync::RwLockReadGuard<'_, Surface> {
        self.surface.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_surface(&self) -> std::sync::RwLockWriteGuard<'_, Surface> {
        self.surface.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DevClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevClient")
            .field("config", &self.config)
            .field("identity", &self.identity)
            .field("plugins", &self.plugin_names())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
