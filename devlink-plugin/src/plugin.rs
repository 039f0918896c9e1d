use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::command::Command;
use crate::error::Result;
use crate::features::Features;

/// Where plugins send commands destined for the debugging server.
///
/// The client implements this; commands are delivered immediately when a
/// connection is open and queued otherwise.
pub trait CommandSink: Send + Sync {
    fn send(&self, command: Command);
}

/// Handle given to every plugin hook.
///
/// Cheap to clone, so a plugin may keep one from `on_activate` and use it
/// from a contributed method later on.
#[derive(Clone)]
pub struct PluginContext {
    sink: Arc<dyn CommandSink>,
    config: Arc<Value>,
}

impl PluginContext {
    pub fn new(sink: Arc<dyn CommandSink>, config: Value) -> Self {
        Self {
            sink,
            config: Arc::new(config),
        }
    }

    pub fn send(&self, command_type: &str, payload: Value) {
        self.sink.send(Command::new(command_type, payload));
    }

    pub fn send_important(&self, command_type: &str, payload: Value) {
        self.sink
            .send(Command::new(command_type, payload).important(true));
    }

    /// Snapshot of the client configuration taken at construction.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Look up a configuration entry by JSON pointer, e.g. `/client/platform`.
    pub fn config_value(&self, pointer: &str) -> Option<&Value> {
        self.config.pointer(pointer)
    }
}

impl fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A capability plugin as seen by the client.
///
/// A plugin type's constructor is its factory: it takes the plugin's
/// optional configuration and returns the value handed to
/// `DevClient::use_plugin`. Every hook has a no-op default.
pub trait Plugin: Send {
    fn name(&self) -> &str;

    /// The configuration the plugin was created with, if any.
    fn config(&self) -> Option<Value> {
        None
    }

    /// Command types (or dotted prefixes) this plugin wants to see.
    /// Empty means every command.
    fn command_prefixes(&self) -> &[&'static str] {
        &[]
    }

    /// Called once when the plugin is activated. The returned features are
    /// merged into the client's surface.
    fn on_activate(&mut self, _ctx: &PluginContext) -> Result<Features> {
        Ok(Features::new())
    }

    fn on_connect(&mut self, _ctx: &PluginContext) {}

    fn on_disconnect(&mut self, _ctx: &PluginContext) {}

    fn on_command(&mut self, _command: &Command, _ctx: &PluginContext) {}

    fn on_deactivate(&mut self, _ctx: &PluginContext) {}
}

/// Whether `plugin` should receive `command`.
pub fn accepts(plugin: &dyn Plugin, command: &Command) -> bool {
    let prefixes = plugin.command_prefixes();
    prefixes.is_empty() || prefixes.iter().any(|p| command.matches_prefix(p))
}
