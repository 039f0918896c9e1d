use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::command::Command;
use crate::plugin::{Plugin, PluginContext, accepts};

/// One activated plugin, in the order it was activated.
pub struct PluginActivation {
    pub name: String,
    pub config: Option<Value>,
    /// Names of the members this plugin contributed to the surface.
    pub features: Vec<String>,
    plugin: Box<dyn Plugin>,
}

impl std::fmt::Debug for PluginActivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginActivation")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

/// Read-only view of an activation, detached from the plugin itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationSummary {
    pub name: String,
    pub config: Option<Value>,
    pub features: Vec<String>,
}

impl From<&PluginActivation> for ActivationSummary {
    fn from(activation: &PluginActivation) -> Self {
        Self {
            name: activation.name.clone(),
            config: activation.config.clone(),
            features: activation.features.clone(),
        }
    }
}

/// Ordered list of activated plugins.
///
/// The same plugin may be activated more than once; every activation is
/// kept and receives callbacks.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    activations: Vec<PluginActivation>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            activations: Vec::new(),
        }
    }

    pub fn record(&mut self, plugin: Box<dyn Plugin>, features: Vec<String>) -> &PluginActivation {
        let index = self.activations.len();
        self.activations.push(PluginActivation {
            name: plugin.name().to_string(),
            config: plugin.config(),
            features,
            plugin,
        });
        &self.activations[index]
    }

    /// The most recent activation with this name.
    pub fn get(&self, name: &str) -> Option<&PluginActivation> {
        self.activations.iter().rev().find(|a| a.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.activations.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn summaries(&self) -> Vec<ActivationSummary> {
        self.activations.iter().map(ActivationSummary::from).collect()
    }

    pub fn all(&self) -> &[PluginActivation] {
        &self.activations
    }

    pub fn len(&self) -> usize {
        self.activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    pub fn connect_all(&mut self, ctx: &PluginContext) {
        for activation in &mut self.activations {
            activation.plugin.on_connect(ctx);
        }
    }

    pub fn disconnect_all(&mut self, ctx: &PluginContext) {
        for activation in &mut self.activations {
            activation.plugin.on_disconnect(ctx);
        }
    }

    /// Deactivate in reverse activation order.
    pub fn deactivate_all(&mut self, ctx: &PluginContext) {
        for activation in self.activations.iter_mut().rev() {
            activation.plugin.on_deactivate(ctx);
        }
    }

    /// Hand `command` to every plugin whose prefixes match, in activation
    /// order. Returns the names of the plugins that received it.
    pub fn dispatch(&mut self, command: &Command, ctx: &PluginContext) -> Vec<String> {
        let mut handled = Vec::new();
        for activation in &mut self.activations {
            if accepts(activation.plugin.as_ref(), command) {
                activation.plugin.on_command(command, ctx);
                handled.push(activation.name.clone());
            }
        }
        debug!(
            command = %command.command_type,
            handlers = handled.len(),
            "dispatched command"
        );
        handled
    }
}
