use devlink_plugin::{Features, Plugin, PluginContext, Result, command_types};
use serde_json::{Value, json};

use crate::names;

/// Forwards application log output as `log` commands.
#[derive(Debug, Default)]
pub struct TrackGlobalLogs;

impl TrackGlobalLogs {
    pub fn new() -> Self {
        Self
    }
}

fn level_method(
    level: &'static str,
) -> impl Fn(&PluginContext, &[Value]) -> Result<Value> + Send + Sync + 'static {
    move |ctx: &PluginContext, args: &[Value]| {
        let message = args.first().cloned().unwrap_or(Value::Null);
        ctx.send(command_types::LOG, json!({ "level": level, "message": message }));
        Ok(Value::Null)
    }
}

impl Plugin for TrackGlobalLogs {
    fn name(&self) -> &str {
        names::TRACK_GLOBAL_LOGS
    }

    fn on_activate(&mut self, _ctx: &PluginContext) -> Result<Features> {
        Ok(Features::new()
            .with_method("log", level_method("debug"))
            .with_method("debug", level_method("debug"))
            .with_method("warn", level_method("warn")))
    }
}
