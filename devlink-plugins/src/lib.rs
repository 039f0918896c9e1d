//! Built-in capability plugins.
//!
//! Each plugin is created from optional options (`Plugin::new(None)` uses
//! the defaults) and activated on a client with `use_plugin`. Options
//! passed in are reported back unchanged through `Plugin::config`.

pub mod async_storage;
pub mod dev_tools;
pub mod editor;
pub mod errors;
pub mod logs;
pub mod networking;
pub mod overlay;
mod pending;
pub mod storybook;

pub use async_storage::{AsyncStorage, AsyncStorageOptions, AsyncStorageTracking};
pub use dev_tools::{DevTools, DevToolsAction, DevToolsState};
pub use editor::{EditorRequest, EditorRequests, OpenInEditor, OpenInEditorOptions};
pub use errors::{TrackGlobalErrors, TrackGlobalErrorsOptions};
pub use logs::TrackGlobalLogs;
pub use networking::{Networking, NetworkingOptions};
pub use overlay::{Overlay, OverlayState};
pub use pending::MAX_PENDING;
pub use storybook::{Storybook, StorybookState};

/// Names the built-in plugins register under.
pub mod names {
    pub const ASYNC_STORAGE: &str = "asyncStorage";
    pub const TRACK_GLOBAL_ERRORS: &str = "trackGlobalErrors";
    pub const TRACK_GLOBAL_LOGS: &str = "trackGlobalLogs";
    pub const OPEN_IN_EDITOR: &str = "openInEditor";
    pub const OVERLAY: &str = "overlay";
    pub const NETWORKING: &str = "networking";
    pub const STORYBOOK: &str = "storybook";
    pub const DEV_TOOLS: &str = "devTools";
}

/// Snapshot of caller-supplied options, if any.
fn options_snapshot<T: serde::Serialize>(options: Option<&T>) -> Option<serde_json::Value> {
    options.and_then(|o| serde_json::to_value(o).ok())
}
