use super::bridge::{self, BRIDGE_DISCRIMINATOR, BridgeRejection};
use super::collector::ErrorCollector;
use super::error::PreviewError;
use super::markup;
use super::renderer::{RenderedPreview, SandboxPolicy, SandboxRenderer};
use crate::file_tree::FileTree;

/// Host-side state of one preview pane: the live sandbox and the errors it
/// has reported.
#[derive(Debug, Default)]
pub struct PreviewSession {
    renderer: SandboxRenderer,
    collector: ErrorCollector,
}

impl PreviewSession {
    pub fn new(policy: SandboxPolicy) -> Self {
        Self {
            renderer: SandboxRenderer::new(policy),
            collector: ErrorCollector::new(),
        }
    }

    /// Starts a new render cycle.
    ///
    /// Errors of the previous sandbox are dropped in the same step that
    /// replaces it, so late reports from it can no longer be accepted.
    pub fn render(&mut self, tree: &FileTree) -> &RenderedPreview {
        self.collector.clear();
        self.renderer.render(tree)
    }

    pub fn current(&self) -> Option<&RenderedPreview> {
        self.renderer.current()
    }

    /// Handles one raw message posted by a sandbox.
    ///
    /// Returns `Ok(true)` if a new error was recorded and `Ok(false)` for a
    /// duplicate.
    pub fn receive(&mut self, raw: &str) -> Result<bool, BridgeRejection> {
        match bridge::accept(self.renderer.live_instance(), raw) {
            Ok(error) => Ok(self.collector.add(error)),
            Err(rejection) => {
                tracing::debug!("[PreviewSession] Dropped sandbox message: {}", rejection);
                Err(rejection)
            }
        }
    }

    pub fn errors(&self) -> &[PreviewError] {
        self.collector.errors()
    }

    /// Dismisses the error panel.
    pub fn clear_errors(&mut self) {
        self.collector.clear();
    }

    pub fn error_report(&self) -> String {
        self.collector.report()
    }

    /// A standalone host page embedding the current render in a sandboxed
    /// iframe, with a small panel listing the errors it reports.
    pub fn host_page(&self, title: &str) -> Option<String> {
        let rendered = self.renderer.current()?;
        let sandbox = self.renderer.policy().sandbox_attribute();
        let instance = markup::js_string_literal(
            rendered.instance_id().map(|id| id.as_str()).unwrap_or_default(),
        );

        Some(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
  html, body {{ margin: 0; height: 100%; font-family: system-ui, sans-serif; }}
  body {{ display: flex; flex-direction: column; }}
  iframe {{ flex: 1; border: 0; width: 100%; background: #fff; }}
  #preview-errors {{ max-height: 30%; overflow: auto; margin: 0; padding: 0 12px;
    background: #1e1e1e; color: #f87171; font: 12px/1.5 monospace; white-space: pre-wrap; }}
</style>
</head>
<body>
<iframe id="preview" title="{title}" sandbox="{sandbox}" srcdoc="{srcdoc}"></iframe>
<pre id="preview-errors"></pre>
<script>
(function () {{
  var frame = document.getElementById("preview");
  var panel = document.getElementById("preview-errors");
  var instance = {instance};
  var seen = {{}};
  window.addEventListener("message", function (event) {{
    if (event.source !== frame.contentWindow) return;
    var data = event.data;
    if (!data || data["{BRIDGE_DISCRIMINATOR}"] !== true || data.instance !== instance) return;
    var id = JSON.stringify({{ type: data.type, payload: data.payload }});
    if (seen[id]) return;
    seen[id] = true;
    var payload = data.payload || {{}};
    var message = payload.message || (payload.args || []).join(" ") || "Error";
    var where = payload.source ? " (" + payload.source + (payload.line ? ":" + payload.line : "") + ")" : "";
    panel.textContent += "[" + data.type + "] " + message + where + "\n";
  }});
}})();
</script>
</body>
</html>
"#,
            title = markup::escape_attribute(title),
            srcdoc = markup::escape_attribute(rendered.document()),
        ))
    }
}
