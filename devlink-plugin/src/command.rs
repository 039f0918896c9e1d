use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known command types shared by the client and its plugins.
pub mod types {
    pub const CLIENT_INTRO: &str = "client.intro";
    pub const SET_CLIENT_ID: &str = "setClientId";
    pub const DISPLAY: &str = "display";
    pub const LOG: &str = "log";
}

/// A message exchanged with the debugging server.
///
/// Outbound commands carry a timestamp and the time elapsed since the
/// previous send; inbound commands usually only have `type` and `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    #[serde(rename = "type")]
    pub command_type: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub important: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_time: Option<u64>,
}

impl Command {
    pub fn new(command_type: &str, payload: Value) -> Self {
        Self {
            command_type: command_type.into(),
            payload,
            important: false,
            date: None,
            delta_time: None,
        }
    }

    pub fn important(mut self, important: bool) -> Self {
        self.important = important;
        self
    }

    /// Stamp the command with the current time and the delta since the
    /// previous outbound command.
    pub fn stamped(mut self, delta_time_ms: u64) -> Self {
        self.date = Some(Utc::now().to_rfc3339());
        self.delta_time = Some(delta_time_ms);
        self
    }

    /// Whether this command belongs to `prefix`: either the exact type or a
    /// dotted sub-type of it.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.command_type == prefix
            || self
                .command_type
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_wire_shape_uses_type_and_camel_case() {
        let cmd = Command::new("client.intro", json!({"name": "app"}))
            .important(true)
            .stamped(12);
        let value = serde_json::to_value(&cmd).unwrap();

        assert_eq!(value["type"], "client.intro");
        assert_eq!(value["payload"]["name"], "app");
        assert_eq!(value["important"], true);
        assert_eq!(value["deltaTime"], 12);
        assert!(value["date"].is_string());
    }

    #[test]
    fn test_inbound_command_defaults() {
        let cmd: Command = serde_json::from_str(r#"{"type":"setClientId","payload":"abc"}"#).unwrap();
        assert_eq!(cmd.command_type, "setClientId");
        assert_eq!(cmd.payload, json!("abc"));
        assert!(!cmd.important);
        assert!(cmd.date.is_none());
        assert!(cmd.delta_time.is_none());

        let bare: Command = serde_json::from_str(r#"{"type":"overlay"}"#).unwrap();
        assert_eq!(bare.payload, Value::Null);
    }

    #[test]
    fn test_unstamped_command_omits_timing() {
        let value = serde_json::to_value(Command::new("log", json!(1))).unwrap();
        assert!(value.get("date").is_none());
        assert!(value.get("deltaTime").is_none());
    }

    #[test]
    fn test_prefix_matching() {
        let cmd = Command::new("editor.open", Value::Null);
        assert!(cmd.matches_prefix("editor"));
        assert!(cmd.matches_prefix("editor.open"));
        assert!(!cmd.matches_prefix("edit"));
        assert!(!cmd.matches_prefix("editor.open.extra"));

        let flat = Command::new("overlay", Value::Null);
        assert!(flat.matches_prefix("overlay"));
    }
}
