use std::sync::Arc;

use devlink_plugin::{Command, Features, Plugin, PluginContext, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::names;
use crate::pending::Pending;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevToolsAction {
    OpenMenu,
    Reload,
}

/// Developer-menu actions requested by the server and not yet handled.
#[derive(Debug, Default)]
pub struct DevToolsState(Pending<DevToolsAction>);

impl DevToolsState {
    pub fn take(&self) -> Vec<DevToolsAction> {
        self.0.take()
    }
}

/// Relays `devtools.open` and `devtools.reload` to the embedding app.
#[derive(Debug, Default)]
pub struct DevTools {
    state: Arc<DevToolsState>,
}

impl DevTools {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for DevTools {
    fn name(&self) -> &str {
        names::DEV_TOOLS
    }

    fn command_prefixes(&self) -> &[&'static str] {
        &["devtools"]
    }

    fn on_activate(&mut self, _ctx: &PluginContext) -> Result<Features> {
        Ok(Features::new().with_extension(Arc::clone(&self.state)))
    }

    fn on_command(&mut self, command: &Command, _ctx: &PluginContext) {
        let action = match command.command_type.as_str() {
            "devtools.open" => DevToolsAction::OpenMenu,
            "devtools.reload" => DevToolsAction::Reload,
            _ => return,
        };
        if self.state.0.push(action) {
            debug!("dropped oldest unhandled devtools action");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{activate, context};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn test_actions_are_queued_in_order() {
        let (_sink, ctx) = context();
        let mut plugin = DevTools::new();
        let surface = activate(&mut plugin, &ctx);

        plugin.on_command(&Command::new("devtools.reload", Value::Null), &ctx);
        plugin.on_command(&Command::new("devtools.unknown", Value::Null), &ctx);
        plugin.on_command(&Command::new("devtools.open", Value::Null), &ctx);

        let state = surface.extension::<DevToolsState>().unwrap();
        assert_eq!(
            state.take(),
            vec![DevToolsAction::Reload, DevToolsAction::OpenMenu]
        );
        assert!(state.take().is_empty());
    }

    #[test]
    fn test_unhandled_actions_are_capped() {
        let (_sink, ctx) = context();
        let mut plugin = DevTools::new();
        let surface = activate(&mut plugin, &ctx);

        plugin.on_command(&Command::new("devtools.open", Value::Null), &ctx);
        for _ in 0..crate::MAX_PENDING {
            plugin.on_command(&Command::new("devtools.reload", Value::Null), &ctx);
        }
        let actions = surface.extension::<DevToolsState>().unwrap().take();
        assert_eq!(actions.len(), crate::MAX_PENDING);
        assert!(actions.iter().all(|a| *a == DevToolsAction::Reload));
    }
}
