use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a plugin is in its life on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Handed to the client but not yet activated.
    Pending,
    Active,
    Connected,
    Disconnected,
    Deactivated,
    /// Activation failed; the plugin was not recorded.
    Failed,
}

impl PluginState {
    /// `Deactivated` is final and a failed plugin can only be activated
    /// again. Everything else may follow the connection around.
    pub fn can_move_to(self, next: PluginState) -> bool {
        match self {
            PluginState::Deactivated => false,
            PluginState::Failed => matches!(next, PluginState::Active),
            _ => self != next,
        }
    }
}

/// A recorded state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub plugin_name: String,
    pub from_state: PluginState,
    pub to_state: PluginState,
    /// RFC 3339.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tracks the lifecycle state of plugins by name.
///
/// Activations that share a name share one entry: activating a name twice
/// leaves it `Active` with a single event, and the registry keeps both
/// plugin instances.
#[derive(Debug, Clone, Default)]
pub struct LifecycleTracker {
    states: HashMap<String, PluginState>,
    events: Vec<LifecycleEvent>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `plugin_name` to `to_state`. Returns `false`, recording
    /// nothing, when the move is not allowed from the current state.
    pub fn transition(&mut self, plugin_name: &str, to_state: PluginState) -> bool {
        self.record(plugin_name, to_state, None)
    }

    pub fn fail(&mut self, plugin_name: &str, error: &str) -> bool {
        self.record(plugin_name, PluginState::Failed, Some(error.to_string()))
    }

    fn record(&mut self, plugin_name: &str, to_state: PluginState, error: Option<String>) -> bool {
        let from_state = self.state_of(plugin_name);
        if from_state == to_state && error.is_none() {
            return false;
        }
        if !from_state.can_move_to(to_state) {
            debug!(plugin = plugin_name, ?from_state, ?to_state, "ignored lifecycle transition");
            return false;
        }
        self.states.insert(plugin_name.to_string(), to_state);
        self.events.push(LifecycleEvent {
            plugin_name: plugin_name.into(),
            from_state,
            to_state,
            timestamp: Utc::now().to_rfc3339(),
            error,
        });
        true
    }

    pub fn state_of(&self, plugin_name: &str) -> PluginState {
        self.states
            .get(plugin_name)
            .copied()
            .unwrap_or(PluginState::Pending)
    }

    pub fn events_for(&self, plugin_name: &str) -> Vec<&LifecycleEvent> {
        self.events
            .iter()
            .filter(|e| e.plugin_name == plugin_name)
            .collect()
    }

    pub fn in_state(&self, state: PluginState) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .states
            .iter()
            .filter_map(|(name, s)| (*s == state).then_some(name.as_str()))
            .collect();
        names.sort_unstable();
        names
    }

    /// The error from the most recent failed activation of `plugin_name`.
    pub fn last_error(&self, plugin_name: &str) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .filter(|e| e.plugin_name == plugin_name)
            .find_map(|e| e.error.as_deref())
    }
}
