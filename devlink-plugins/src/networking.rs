use devlink_plugin::{Features, Plugin, PluginContext, PluginError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::names;

/// Responses with these content types carry binary bodies nobody wants to
/// read in a log.
const DEFAULT_IGNORED_CONTENT_TYPES: &str = "(?i)^image/.*$";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct NetworkingOptions {
    /// Regex matched against the response content type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_content_types: Option<String>,
    /// Regex matched against the request URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_urls: Option<String>,
}

/// Reports completed HTTP exchanges as `api.response` commands.
pub struct Networking {
    options: Option<NetworkingOptions>,
}

impl Networking {
    pub fn new(options: Option<NetworkingOptions>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> Option<&NetworkingOptions> {
        self.options.as_ref()
    }

    fn compile(&self, pattern: Option<&str>) -> Result<Option<Regex>> {
        pattern
            .map(|p| Regex::new(p).map_err(|e| PluginError::invalid_config(self.name(), e)))
            .transpose()
    }
}

struct Filters {
    content_types: Option<Regex>,
    urls: Option<Regex>,
}

impl Filters {
    fn ignores(&self, exchange: &Value) -> bool {
        let url = exchange
            .pointer("/request/url")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let content_type = exchange
            .pointer("/response/headers/content-type")
            .and_then(Value::as_str)
            .unwrap_or_default();

        self.urls.as_ref().is_some_and(|re| re.is_match(url))
            || self
                .content_types
                .as_ref()
                .is_some_and(|re| re.is_match(content_type))
    }
}

impl Plugin for Networking {
    fn name(&self) -> &str {
        names::NETWORKING
    }

    fn config(&self) -> Option<Value> {
        crate::options_snapshot(self.options.as_ref())
    }

    /// Compiles the ignore patterns; a bad pattern fails activation.
    fn on_activate(&mut self, _ctx: &PluginContext) -> Result<Features> {
        let options = self.options.clone().unwrap_or_default();
        let filters = Filters {
            content_types: self.compile(Some(
                options
                    .ignore_content_types
                    .as_deref()
                    .unwrap_or(DEFAULT_IGNORED_CONTENT_TYPES),
            ))?,
            urls: self.compile(options.ignore_urls.as_deref())?,
        };

        Ok(Features::new().with_method("reportRequest", move |ctx, args| {
            let exchange = args.first().cloned().unwrap_or(Value::Null);
            if filters.ignores(&exchange) {
                return Ok(Value::Bool(false));
            }
            ctx.send("api.response", exchange);
            Ok(Value::Bool(true))
        }))
    }
}
