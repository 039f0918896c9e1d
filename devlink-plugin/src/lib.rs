pub mod command;
pub mod error;
pub mod features;
pub mod lifecycle;
pub mod plugin;
pub mod registry;

// Re-export key types for convenience.
pub use command::{Command, types as command_types};
pub use error::{PluginError, Result};
pub use features::{Feature, Features, MethodFn, Surface, arg_str};
pub use lifecycle::{LifecycleEvent, LifecycleTracker, PluginState};
pub use plugin::{CommandSink, Plugin, PluginContext, accepts};
pub use registry::{ActivationSummary, PluginActivation, PluginRegistry};
