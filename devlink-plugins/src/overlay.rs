use std::sync::{Arc, Mutex, PoisonError};

use devlink_plugin::{Command, Features, Plugin, PluginContext, Result};
use serde_json::Value;

use crate::names;

/// The most recent overlay payload pushed by the debugging server.
#[derive(Debug, Default)]
pub struct OverlayState(Mutex<Option<Value>>);

impl OverlayState {
    pub fn current(&self) -> Option<Value> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Keeps the overlay image/layout sent from the server for the UI layer to
/// render.
#[derive(Debug, Default)]
pub struct Overlay {
    state: Arc<OverlayState>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for Overlay {
    fn name(&self) -> &str {
        names::OVERLAY
    }

    fn command_prefixes(&self) -> &[&'static str] {
        &["overlay"]
    }

    fn on_activate(&mut self, _ctx: &PluginContext) -> Result<Features> {
        Ok(Features::new().with_extension(Arc::clone(&self.state)))
    }

    fn on_command(&mut self, command: &Command, _ctx: &PluginContext) {
        *self.state.0.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(command.payload.clone());
    }

    fn on_disconnect(&mut self, _ctx: &PluginContext) {
        *self.state.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{activate, context};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_keeps_latest_payload_until_disconnect() {
        let (_sink, ctx) = context();
        let mut plugin = Overlay::new();
        let surface = activate(&mut plugin, &ctx);
        let state = surface.extension::<OverlayState>().unwrap();
        assert!(state.current().is_none());

        plugin.on_command(&Command::new("overlay", json!({"opacity": 0.5})), &ctx);
        plugin.on_command(&Command::new("overlay", json!({"opacity": 0.8})), &ctx);
        assert_eq!(state.current(), Some(json!({"opacity": 0.8})));

        plugin.on_disconnect(&ctx);
        assert!(state.current().is_none());
    }
}
