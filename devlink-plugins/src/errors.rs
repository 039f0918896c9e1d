use devlink_plugin::{Features, Plugin, PluginContext, Result, arg_str, command_types};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::names;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TrackGlobalErrorsOptions {
    /// Errors whose message contains any of these are not reported.
    pub veto: Vec<String>,
}

/// Reports uncaught errors as important `log` commands.
pub struct TrackGlobalErrors {
    options: Option<TrackGlobalErrorsOptions>,
}

impl TrackGlobalErrors {
    pub fn new(options: Option<TrackGlobalErrorsOptions>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> Option<&TrackGlobalErrorsOptions> {
        self.options.as_ref()
    }
}

impl Plugin for TrackGlobalErrors {
    fn name(&self) -> &str {
        names::TRACK_GLOBAL_ERRORS
    }

    fn config(&self) -> Option<Value> {
        crate::options_snapshot(self.options.as_ref())
    }

    fn on_activate(&mut self, _ctx: &PluginContext) -> Result<Features> {
        let veto = self.options.clone().unwrap_or_default().veto;
        Ok(Features::new().with_method("reportError", move |ctx, args| {
            let message = arg_str(args, 0, "reportError")?;
            if veto.iter().any(|v| message.contains(v.as_str())) {
                return Ok(Value::Bool(false));
            }
            let stack = args.get(1).cloned().unwrap_or(Value::Null);
            ctx.send_important(
                command_types::LOG,
                json!({ "level": "error", "message": message, "stack": stack }),
            );
            Ok(Value::Bool(true))
        }))
    }
}
