use std::sync::Arc;

use devlink_plugin::{Command, Features, Plugin, PluginContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::names;
use crate::pending::Pending;

const DEFAULT_URL: &str = "http://localhost:8081";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct OpenInEditorOptions {
    /// Base URL of the development server that opens files in an editor.
    pub url: String,
}

impl Default for OpenInEditorOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.into(),
        }
    }
}

/// A request from the debugging server to open a source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRequest {
    /// Where the embedding application should post the request.
    pub endpoint: String,
    pub file: String,
    pub line_number: Option<u64>,
}

/// Open-in-editor requests not yet taken, oldest first. Holds at most
/// [`MAX_PENDING`](crate::MAX_PENDING).
#[derive(Debug, Default)]
pub struct EditorRequests(Pending<EditorRequest>);

impl EditorRequests {
    pub fn take(&self) -> Vec<EditorRequest> {
        self.0.take()
    }
}

/// Turns `editor.open` commands into [`EditorRequest`]s.
pub struct OpenInEditor {
    options: Option<OpenInEditorOptions>,
    requests: Arc<EditorRequests>,
}

impl OpenInEditor {
    pub fn new(options: Option<OpenInEditorOptions>) -> Self {
        Self {
            options,
            requests: Arc::new(EditorRequests::default()),
        }
    }

    pub fn options(&self) -> Option<&OpenInEditorOptions> {
        self.options.as_ref()
    }

    fn endpoint(&self) -> String {
        let url = self
            .options
            .as_ref()
            .map_or(DEFAULT_URL, |o| o.url.as_str());
        format!("{}/open-stack-frame", url.trim_end_matches('/'))
    }
}

impl Plugin for OpenInEditor {
    fn name(&self) -> &str {
        names::OPEN_IN_EDITOR
    }

    fn config(&self) -> Option<Value> {
        crate::options_snapshot(self.options.as_ref())
    }

    fn command_prefixes(&self) -> &[&'static str] {
        &["editor"]
    }

    fn on_activate(&mut self, _ctx: &PluginContext) -> Result<Features> {
        Ok(Features::new().with_extension(Arc::clone(&self.requests)))
    }

    fn on_command(&mut self, command: &Command, _ctx: &PluginContext) {
        if command.command_type != "editor.open" {
            return;
        }
        let Some(file) = command.payload.get("file").and_then(Value::as_str) else {
            warn!("editor.open without a file");
            return;
        };
        let request = EditorRequest {
            endpoint: self.endpoint(),
            file: file.to_string(),
            line_number: command.payload.get("lineNumber").and_then(Value::as_u64),
        };
        info!(file = %request.file, endpoint = %request.endpoint, "open in editor requested");
        if self.requests.0.push(request) {
            debug!("dropped oldest unclaimed editor request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{activate, context};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_editor_open_is_recorded() {
        let (_sink, ctx) = context();
        let mut plugin = OpenInEditor::new(None);
        let surface = activate(&mut plugin, &ctx);

        plugin.on_command(
            &Command::new("editor.open", json!({"file": "src/App.tsx", "lineNumber": 12})),
            &ctx,
        );
        plugin.on_command(&Command::new("editor.close", json!({"file": "x"})), &ctx);
        plugin.on_command(&Command::new("editor.open", json!({})), &ctx);

        let requests = surface.extension::<EditorRequests>().unwrap().take();
        assert_eq!(
            requests,
            vec![EditorRequest {
                endpoint: "http://localhost:8081/open-stack-frame".into(),
                file: "src/App.tsx".into(),
                line_number: Some(12),
            }]
        );
        assert!(plugin.requests.take().is_empty());
    }

    #[test]
    fn test_custom_url_is_used() {
        let plugin = OpenInEditor::new(Some(OpenInEditorOptions {
            url: "http://192.168.1.5:19000/".into(),
        }));
        assert_eq!(plugin.endpoint(), "http://192.168.1.5:19000/open-stack-frame");
        assert_eq!(plugin.config(), Some(json!({"url": "http://192.168.1.5:19000/"})));
        assert_eq!(plugin.command_prefixes(), &["editor"]);
    }

    #[test]
    fn test_partial_options_fill_defaults() {
        let options: OpenInEditorOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, OpenInEditorOptions::default());
    }

    #[test]
    fn test_unclaimed_requests_are_capped() {
        let (_sink, ctx) = context();
        let mut plugin = OpenInEditor::new(None);
        let surface = activate(&mut plugin, &ctx);

        for line in 0..(crate::MAX_PENDING as u64 + 3) {
            plugin.on_command(
                &Command::new("editor.open", json!({"file": "a.ts", "lineNumber": line})),
                &ctx,
            );
        }
        let requests = surface.extension::<EditorRequests>().unwrap().take();
        assert_eq!(requests.len(), crate::MAX_PENDING);
        assert_eq!(requests[0].line_number, Some(3));
    }
}
