//! The default plugin set and its one-call activation.

use devlink_plugin::Plugin;
use devlink_plugins::{
    AsyncStorage, AsyncStorageOptions, DevTools, Networking, NetworkingOptions, OpenInEditor,
    OpenInEditorOptions, Overlay, Storybook, TrackGlobalErrors, TrackGlobalErrorsOptions,
    TrackGlobalLogs,
};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::DevClient;
use crate::error::Result;

/// `false` to skip a plugin, `true` for its defaults, or its options.
///
/// Options are parsed strictly: an unknown key is an error naming it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PluginToggle<T> {
    Enabled(bool),
    Configured(T),
}

impl<T> PluginToggle<T> {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Enabled(false))
    }

    pub fn into_options(self) -> Option<T> {
        match self {
            Self::Configured(options) => Some(options),
            Self::Enabled(_) => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for PluginToggle<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(enabled) => Ok(Self::Enabled(enabled)),
            options => serde_json::from_value(options)
                .map(Self::Configured)
                .map_err(de::Error::custom),
        }
    }
}

impl<T> Default for PluginToggle<T> {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl<T> From<bool> for PluginToggle<T> {
    fn from(enabled: bool) -> Self {
        Self::Enabled(enabled)
    }
}

/// Configuration of a default plugin that takes none. Only `{}` parses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoOptions {}

/// Which default plugins to activate. Omitted keys mean enabled.
///
/// Every key takes a [`PluginToggle`]. `log`, `overlay`, `storybook` and
/// `devTools` have no options, so an object for them just means enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DefaultPluginOptions {
    pub errors: PluginToggle<TrackGlobalErrorsOptions>,
    pub log: PluginToggle<NoOptions>,
    pub editor: PluginToggle<OpenInEditorOptions>,
    pub overlay: PluginToggle<NoOptions>,
    pub async_storage: PluginToggle<AsyncStorageOptions>,
    pub networking: PluginToggle<NetworkingOptions>,
    pub storybook: PluginToggle<NoOptions>,
    pub dev_tools: PluginToggle<NoOptions>,
}

/// The default plugins with no options, in their canonical order.
pub fn core_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(AsyncStorage::new(None)),
        Box::new(TrackGlobalErrors::new(None)),
        Box::new(TrackGlobalLogs::new()),
        Box::new(OpenInEditor::new(None)),
        Box::new(Overlay::new()),
        Box::new(Networking::new(None)),
        Box::new(Storybook::new()),
        Box::new(DevTools::new()),
    ]
}

impl DevClient {
    /// Activate the default plugins selected by `options`.
    ///
    /// Stops at the first plugin that fails to activate; plugins activated
    /// before it stay active.
    pub fn use_defaults(&self, options: DefaultPluginOptions) -> Result<&Self> {
        let DefaultPluginOptions {
            errors,
            log,
            editor,
            overlay,
            async_storage,
            networking,
            storybook,
            dev_tools,
        } = options;

        if errors.is_enabled() {
            self.use_plugin(TrackGlobalErrors::new(errors.into_options()))?;
        }
        if log.is_enabled() {
            self.use_plugin(TrackGlobalLogs::new())?;
        }
        if editor.is_enabled() {
            self.use_plugin(OpenInEditor::new(editor.into_options()))?;
        }
        if overlay.is_enabled() {
            self.use_plugin(Overlay::new())?;
        }
        if async_storage.is_enabled() {
            self.use_plugin(AsyncStorage::new(async_storage.into_options()))?;
        }
        if networking.is_enabled() {
            self.use_plugin(Networking::new(networking.into_options()))?;
        }
        if storybook.is_enabled() {
            self.use_plugin(Storybook::new())?;
        }
        if dev_tools.is_enabled() {
            self.use_plugin(DevTools::new())?;
        }

        debug!(plugins = ?self.plugin_names(), "default plugins activated");
        Ok(self)
    }
}
