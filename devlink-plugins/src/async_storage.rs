use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use devlink_plugin::{Features, Plugin, PluginContext, Result, arg_str};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::names;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AsyncStorageOptions {
    /// Keys whose mutations are never reported.
    pub ignore: Vec<String>,
}

/// Whether storage mutations are currently forwarded.
#[derive(Debug)]
pub struct AsyncStorageTracking(AtomicBool);

impl AsyncStorageTracking {
    pub fn is_tracking(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Forwards key-value storage mutations to the debugging server.
pub struct AsyncStorage {
    options: Option<AsyncStorageOptions>,
    tracking: Arc<AsyncStorageTracking>,
}

impl AsyncStorage {
    pub fn new(options: Option<AsyncStorageOptions>) -> Self {
        Self {
            options,
            tracking: Arc::new(AsyncStorageTracking(AtomicBool::new(true))),
        }
    }

    pub fn options(&self) -> Option<&AsyncStorageOptions> {
        self.options.as_ref()
    }
}

impl Plugin for AsyncStorage {
    fn name(&self) -> &str {
        names::ASYNC_STORAGE
    }

    fn config(&self) -> Option<Value> {
        crate::options_snapshot(self.options.as_ref())
    }

    fn on_activate(&mut self, _ctx: &PluginContext) -> Result<Features> {
        let ignore = self.options.clone().unwrap_or_default().ignore;
        let on = Arc::clone(&self.tracking);
        let off = Arc::clone(&self.tracking);
        let report = Arc::clone(&self.tracking);

        Ok(Features::new()
            .with_method("trackAsyncStorage", move |_, _| {
                on.0.store(true, Ordering::SeqCst);
                Ok(Value::Null)
            })
            .with_method("untrackAsyncStorage", move |_, _| {
                off.0.store(false, Ordering::SeqCst);
                Ok(Value::Null)
            })
            .with_method("reportAsyncStorageMutation", move |ctx, args| {
                let action = arg_str(args, 0, "reportAsyncStorageMutation")?;
                let data = args.get(1).cloned().unwrap_or(Value::Null);
                let key = data.get("key").and_then(Value::as_str).unwrap_or_default();
                if !report.is_tracking() || ignore.iter().any(|k| k == key) {
                    return Ok(Value::Bool(false));
                }
                ctx.send("asyncStorage.mutation", json!({ "action": action, "data": data }));
                Ok(Value::Bool(true))
            })
            .with_extension(Arc::clone(&self.tracking)))
    }
}
