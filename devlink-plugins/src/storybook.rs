use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use devlink_plugin::{Command, Features, Plugin, PluginContext, Result};
use serde_json::Value;
use tracing::debug;

use crate::names;

/// Whether the server asked the app to show its component storybook.
#[derive(Debug, Default)]
pub struct StorybookState(AtomicBool);

impl StorybookState {
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct Storybook {
    state: Arc<StorybookState>,
}

impl Storybook {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for Storybook {
    fn name(&self) -> &str {
        names::STORYBOOK
    }

    fn command_prefixes(&self) -> &[&'static str] {
        &["storybook"]
    }

    fn on_activate(&mut self, _ctx: &PluginContext) -> Result<Features> {
        Ok(Features::new().with_extension(Arc::clone(&self.state)))
    }

    fn on_command(&mut self, command: &Command, _ctx: &PluginContext) {
        let enabled = command.payload.as_bool().unwrap_or(false);
        self.state.0.store(enabled, Ordering::SeqCst);
        debug!(enabled, "storybook toggled");
    }
}
