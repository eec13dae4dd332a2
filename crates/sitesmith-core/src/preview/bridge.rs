//! Sandbox -> host error messages.
//!
//! Wire shape, as posted by the shim:
//!
//! ```json
//! { "__PREVIEW_ERROR__": true, "instance": "<token>", "type": "runtime",
//!   "payload": { "message": "...", "source": "script.js", "line": 3, "column": 7, "stack": "..." } }
//! ```
//!
//! The discriminator marks the message as ours; `instance` ties it to the
//! sandbox that posted it so reports from a torn-down sandbox are refused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::{PreviewError, PreviewErrorKind};
use super::renderer::SandboxInstanceId;

/// Private field every bridge message carries, set to `true`.
pub const BRIDGE_DISCRIMINATOR: &str = "__PREVIEW_ERROR__";

/// Global the shim defines so the script's failure boundary can report.
pub(super) const REPORT_HOOK: &str = "__PREVIEW_REPORT__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeMessage {
    #[serde(rename = "__PREVIEW_ERROR__")]
    pub discriminator: bool,
    pub instance: String,
    #[serde(rename = "type")]
    pub kind: PreviewErrorKind,
    #[serde(default)]
    pub payload: BridgePayload,
}

/// Why a message from the sandbox side was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeRejection {
    #[error("message does not carry the preview discriminator")]
    NotBridgeMessage,

    #[error("malformed preview message: {0}")]
    Malformed(String),

    #[error("message from sandbox '{received}' does not match the live sandbox")]
    UnknownInstance { received: String },
}

#[derive(Serialize)]
struct Fingerprint<'a> {
    #[serde(rename = "type")]
    kind: PreviewErrorKind,
    payload: &'a BridgePayload,
}

impl BridgeMessage {
    pub fn new(instance: &SandboxInstanceId, kind: PreviewErrorKind, payload: BridgePayload) -> Self {
        Self {
            discriminator: true,
            instance: instance.as_str().to_string(),
            kind,
            payload,
        }
    }

    /// Stable fingerprint over the full report (type and payload).
    pub fn fingerprint(&self) -> String {
        let fingerprint = Fingerprint {
            kind: self.kind,
            payload: &self.payload,
        };
        // Serializing plain strings and integers cannot fail.
        serde_json::to_string(&fingerprint).unwrap_or_default()
    }

    pub fn into_preview_error(self) -> PreviewError {
        let id = self.fingerprint();
        let payload = self.payload;
        let message = payload
            .message
            .filter(|message| !message.is_empty())
            .or_else(|| Some(payload.args.join(" ")).filter(|joined| !joined.is_empty()))
            .unwrap_or_else(|| "Error".to_string());

        PreviewError {
            id,
            kind: self.kind,
            message,
            source_file: payload.source,
            line: payload.line,
            column: payload.column,
            stack: payload.stack,
        }
    }
}

/// Validates a raw message received from a sandbox.
///
/// `live` is the sandbox the host currently displays; with no live sandbox
/// every message is refused.
pub fn accept(live: Option<&SandboxInstanceId>, raw: &str) -> Result<PreviewError, BridgeRejection> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| BridgeRejection::NotBridgeMessage)?;
    if value.get(BRIDGE_DISCRIMINATOR) != Some(&serde_json::Value::Bool(true)) {
        return Err(BridgeRejection::NotBridgeMessage);
    }

    let message: BridgeMessage =
        serde_json::from_value(value).map_err(|e| BridgeRejection::Malformed(e.to_string()))?;
    if live.is_none_or(|live| live.as_str() != message.instance) {
        return Err(BridgeRejection::UnknownInstance {
            received: message.instance,
        });
    }
    Ok(message.into_preview_error())
}

/// The reporting shim installed in the sandbox head, before any page code.
pub(super) fn shim_script(instance: &SandboxInstanceId) -> String {
    let instance = serde_json::Value::String(instance.as_str().to_string()).to_string();
    format!(
        r#"(function () {{
  var KEY = "{BRIDGE_DISCRIMINATOR}";
  var INSTANCE = {instance};
  function send(type, payload) {{
    var message = {{ instance: INSTANCE, type: type, payload: payload }};
    message[KEY] = true;
    try {{ parent.postMessage(message, "*"); }} catch (_) {{}}
  }}
  function describe(value) {{
    if (typeof value === "string") return value;
    if (value instanceof Error) return value.stack || value.message;
    try {{ return JSON.stringify(value); }} catch (_) {{ return String(value); }}
  }}
  function report(error) {{
    send("runtime", {{
      message: error && error.message ? String(error.message) : describe(error),
      source: "script.js",
      stack: error && error.stack ? String(error.stack) : undefined
    }});
  }}
  Object.defineProperty(window, "{REPORT_HOOK}", {{ value: report }});
  window.onerror = function (message, source, line, column, error) {{
    send("runtime", {{
      message: String(message),
      source: source || undefined,
      line: line || undefined,
      column: column || undefined,
      stack: error && error.stack ? String(error.stack) : undefined
    }});
  }};
  window.addEventListener("unhandledrejection", function (event) {{
    var reason = event.reason;
    send("promise", {{
      message: reason && reason.message ? String(reason.message) : describe(reason),
      stack: reason && reason.stack ? String(reason.stack) : undefined
    }});
  }});
  var originalError = console.error;
  console.error = function () {{
    var args = Array.prototype.slice.call(arguments);
    send("console", {{ args: args.map(describe) }});
    return originalError.apply(console, arguments);
  }};
  window.addEventListener("error", function (event) {{
    var target = event.target;
    if (target && target !== window && (target.src || target.href)) {{
      send("resource", {{
        message: "Resource failed to load",
        source: String(target.src || target.href)
      }});
    }}
  }}, true);
}})();"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> SandboxInstanceId {
        SandboxInstanceId::from("abc123")
    }

    fn raw(instance: &str, kind: &str, payload: &str) -> String {
        format!(
            r#"{{"__PREVIEW_ERROR__":true,"instance":"{instance}","type":"{kind}","payload":{payload}}}"#
        )
    }

    #[test]
    fn test_accepts_runtime_error() {
        let live = instance();
        let error = accept(
            Some(&live),
            &raw(
                "abc123",
                "runtime",
                r#"{"message":"x is not defined","source":"script.js","line":3,"column":7}"#,
            ),
        )
        .unwrap();

        assert_eq!(error.kind, PreviewErrorKind::Runtime);
        assert_eq!(error.message, "x is not defined");
        assert_eq!(error.location().as_deref(), Some("script.js:3:7"));
    }

    #[test]
    fn test_console_args_become_message() {
        let live = instance();
        let error = accept(
            Some(&live),
            &raw("abc123", "console", r#"{"args":["failed","42"]}"#),
        )
        .unwrap();
        assert_eq!(error.kind, PreviewErrorKind::ConsoleError);
        assert_eq!(error.message, "failed 42");

        let empty = accept(Some(&live), &raw("abc123", "promise", "{}")).unwrap();
        assert_eq!(empty.message, "Error");
    }

    #[test]
    fn test_rejects_messages_without_discriminator() {
        let live = instance();
        let look_alike = r#"{"instance":"abc123","type":"runtime","payload":{"message":"x"}}"#;
        assert_eq!(accept(Some(&live), look_alike), Err(BridgeRejection::NotBridgeMessage));
        assert_eq!(accept(Some(&live), "not json"), Err(BridgeRejection::NotBridgeMessage));
        let truthy = raw("abc123", "runtime", "{}").replace("true", "1");
        assert_eq!(accept(Some(&live), &truthy), Err(BridgeRejection::NotBridgeMessage));
    }

    #[test]
    fn test_rejects_foreign_instance() {
        let live = instance();
        let message = raw("other", "runtime", r#"{"message":"x"}"#);
        assert!(matches!(
            accept(Some(&live), &message),
            Err(BridgeRejection::UnknownInstance { .. })
        ));
        assert!(accept(None, &raw("abc123", "runtime", "{}")).is_err());
    }

    #[test]
    fn test_rejects_unknown_type() {
        let live = instance();
        assert!(matches!(
            accept(Some(&live), &raw("abc123", "warning", "{}")),
            Err(BridgeRejection::Malformed(_))
        ));
    }

    #[test]
    fn test_fingerprint_covers_whole_report() {
        let live = instance();
        let payload = BridgePayload {
            message: Some("boom".to_string()),
            source: Some("script.js".to_string()),
            line: Some(1),
            ..Default::default()
        };
        let a = BridgeMessage::new(&live, PreviewErrorKind::Runtime, payload.clone());
        let b = BridgeMessage::new(&live, PreviewErrorKind::Runtime, payload.clone());
        let c = BridgeMessage::new(&live, PreviewErrorKind::ConsoleError, payload.clone());
        let d = BridgeMessage::new(
            &live,
            PreviewErrorKind::Runtime,
            BridgePayload {
                line: Some(2),
                ..payload
            },
        );

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(a.fingerprint(), d.fingerprint());
    }

    #[test]
    fn test_shim_embeds_instance_and_channels() {
        let shim = shim_script(&instance());
        assert!(shim.contains(r#"var INSTANCE = "abc123";"#));
        assert!(shim.contains(BRIDGE_DISCRIMINATOR));
        for channel in ["\"runtime\"", "\"promise\"", "\"console\"", "\"resource\""] {
            assert!(shim.contains(channel), "missing channel {channel}");
        }
        // console.error still forwards to the original
        assert!(shim.contains("originalError.apply(console, arguments)"));
    }
}
