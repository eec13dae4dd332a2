use std::fmt;

use uuid::Uuid;

use super::bridge::{REPORT_HOOK, shim_script};
use super::markup;
use crate::bundle::{CanonicalFile, DEFAULT_DATA_DOCUMENT};
use crate::file_tree::FileTree;

/// Document shown when the tree has no `index.html`. It runs no script.
pub const MISSING_MARKUP_PLACEHOLDER: &str = "<!DOCTYPE html>\n<html><head><meta charset=\"UTF-8\"></head><body><h2>index.html missing</h2></body></html>";

const BASE_STYLE: &str = "body { margin: 0; font-family: system-ui, sans-serif; }";

/// Identity of one rendered sandbox. A new one is minted on every render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SandboxInstanceId(String);

impl SandboxInstanceId {
    fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SandboxInstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SandboxInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Isolation settings for the sandbox frame.
///
/// Scripts may run, but the frame never gets `allow-same-origin`: it is an
/// opaque origin with no access to the host's storage, cookies or DOM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SandboxPolicy {
    /// Optional Content-Security-Policy injected as a `<meta>` tag.
    pub content_security_policy: Option<String>,
}

impl SandboxPolicy {
    pub const SANDBOX_ATTRIBUTE: &'static str = "allow-scripts";

    pub fn with_content_security_policy(mut self, policy: impl Into<String>) -> Self {
        self.content_security_policy = Some(policy.into());
        self
    }

    /// Value for the iframe `sandbox` attribute.
    pub fn sandbox_attribute(&self) -> &'static str {
        Self::SANDBOX_ATTRIBUTE
    }
}

/// A built sandbox document together with its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxInstance {
    pub id: SandboxInstanceId,
    pub document: String,
    pub sandbox_attribute: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedPreview {
    Sandbox(SandboxInstance),
    /// `index.html` was missing; nothing executes and no errors can arrive.
    Placeholder,
}

impl RenderedPreview {
    pub fn document(&self) -> &str {
        match self {
            Self::Sandbox(instance) => &instance.document,
            Self::Placeholder => MISSING_MARKUP_PLACEHOLDER,
        }
    }

    pub fn instance_id(&self) -> Option<&SandboxInstanceId> {
        match self {
            Self::Sandbox(instance) => Some(&instance.id),
            Self::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

/// Builds sandbox documents from file trees.
///
/// Each render discards the previous sandbox outright and builds a new one
/// from scratch; there is no incremental patching.
#[derive(Debug, Default)]
pub struct SandboxRenderer {
    policy: SandboxPolicy,
    current: Option<RenderedPreview>,
    renders: u64,
}

impl SandboxRenderer {
    pub fn new(policy: SandboxPolicy) -> Self {
        Self {
            policy,
            current: None,
            renders: 0,
        }
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    pub fn current(&self) -> Option<&RenderedPreview> {
        self.current.as_ref()
    }

    /// The sandbox whose messages are currently acceptable.
    pub fn live_instance(&self) -> Option<&SandboxInstanceId> {
        self.current.as_ref().and_then(RenderedPreview::instance_id)
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Drops the live sandbox, if any.
    pub fn teardown(&mut self) -> Option<RenderedPreview> {
        let previous = self.current.take();
        if let Some(id) = previous.as_ref().and_then(RenderedPreview::instance_id) {
            tracing::debug!("[SandboxRenderer] Tore down sandbox {}", id);
        }
        previous
    }

    /// Tears down the previous sandbox and builds a new one for `tree`.
    pub fn render(&mut self, tree: &FileTree) -> &RenderedPreview {
        self.teardown();
        self.renders += 1;

        let rendered = match tree.find_file_by_name(CanonicalFile::Markup.file_name()) {
            None => {
                tracing::debug!("[SandboxRenderer] index.html missing, showing placeholder");
                RenderedPreview::Placeholder
            }
            Some(index) => {
                let id = SandboxInstanceId::generate();
                let text_of = |kind: CanonicalFile| {
                    tree.find_file_by_name(kind.file_name())
                        .map(|file| file.content.as_str())
                        .unwrap_or_default()
                };
                let document = build_document(
                    &self.policy,
                    &id,
                    &index.content,
                    text_of(CanonicalFile::Style),
                    text_of(CanonicalFile::Script),
                    tree.find_file_by_name(CanonicalFile::DataDocument.file_name())
                        .map(|file| file.content.as_str())
                        .unwrap_or(DEFAULT_DATA_DOCUMENT),
                );
                tracing::debug!(
                    "[SandboxRenderer] Built sandbox {} ({} bytes)",
                    id,
                    document.len()
                );
                RenderedPreview::Sandbox(SandboxInstance {
                    id,
                    document,
                    sandbox_attribute: self.policy.sandbox_attribute(),
                })
            }
        };
        self.current.insert(rendered)
    }
}

fn build_document(
    policy: &SandboxPolicy,
    id: &SandboxInstanceId,
    html: &str,
    style: &str,
    script: &str,
    data_document: &str,
) -> String {
    let body = markup::strip_bundle_references(&markup::strip_document_wrapper(html));
    let csp = policy
        .content_security_policy
        .as_deref()
        .map(|csp| {
            format!(
                "<meta http-equiv=\"Content-Security-Policy\" content=\"{}\">\n",
                markup::escape_attribute(csp)
            )
        })
        .unwrap_or_default();

    let data_override = format!(
        r#"<script>
(function () {{
  var files = {{ "data.json": {data} }};
  var nativeFetch = typeof window.fetch === "function" ? window.fetch.bind(window) : null;
  window.fetch = function (input, init) {{
    if (typeof input === "string" && Object.prototype.hasOwnProperty.call(files, input)) {{
      return Promise.resolve(new Response(files[input], {{
        status: 200,
        headers: {{ "Content-Type": "application/json" }}
      }}));
    }}
    return nativeFetch ? nativeFetch(input, init) : Promise.reject(new TypeError("fetch is unavailable"));
  }};
}})();
</script>
"#,
        data = markup::js_string_literal(data_document)
    );

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
{csp}<script>
{shim}
</script>
<style>
{BASE_STYLE}
{style}
</style>
</head>
<body>
<div id="__root__">{body}</div>
{data_override}<script>
try {{
{script}
}} catch (error) {{
  window.{REPORT_HOOK}(error);
}}
//# sourceURL=script.js
</script>
</body>
</html>
"#,
        shim = shim_script(id),
        style = markup::escape_raw_text(style),
        script = markup::escape_raw_text(script),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{CodeBundle, to_tree};
    use crate::file_tree::FileNode;

    fn tree() -> FileTree {
        to_tree(&CodeBundle::new(
            r#"<!DOCTYPE html><html><head><link rel="stylesheet" href="styles.css"></head><body><main id="app"></main><script src="script.js"></script></body></html>"#,
            ".hero { color: teal; }",
            r#"fetch("data.json").then(r => r.json()).then(d => console.log(d));"#,
            r#"{"title":"</script>"}"#,
        ))
    }

    fn sandbox(rendered: &RenderedPreview) -> &SandboxInstance {
        match rendered {
            RenderedPreview::Sandbox(instance) => instance,
            RenderedPreview::Placeholder => panic!("expected a sandbox"),
        }
    }

    #[test]
    fn test_document_layout() {
        let mut renderer = SandboxRenderer::default();
        let instance = sandbox(renderer.render(&tree())).clone();
        let doc = &instance.document;

        assert!(doc.contains(r#"<div id="__root__"><head></head><main id="app"></main></div>"#));
        assert!(doc.contains(".hero { color: teal; }"));
        assert!(!doc.contains("href=\"styles.css\""));
        assert!(!doc.contains("src=\"script.js\""));
        assert!(doc.contains(instance.id.as_str()));
        assert_eq!(doc.matches("<!DOCTYPE html>").count(), 1);
    }

    #[test]
    fn test_shim_and_data_override_precede_author_script() {
        let mut renderer = SandboxRenderer::default();
        let doc = renderer.render(&tree()).document().to_string();

        let shim = doc.find("__PREVIEW_ERROR__").unwrap();
        let data = doc.find(r#"var files = { "data.json": "#).unwrap();
        let author = doc.find(r#"fetch("data.json")"#).unwrap();
        assert!(shim < data && data < author);
        // the data document cannot close its own script element
        assert!(doc.contains(r#"<\/script>"#));
        assert!(doc.contains("} catch (error) {"));
    }

    #[test]
    fn test_sandbox_is_script_only() {
        let mut renderer = SandboxRenderer::default();
        let instance = sandbox(renderer.render(&tree())).clone();
        assert_eq!(instance.sandbox_attribute, "allow-scripts");
        assert!(!instance.sandbox_attribute.contains("allow-same-origin"));
        // page code reaches the host only through postMessage
        assert!(!instance.document.contains("parent.document"));
        assert!(!instance.document.contains("top."));
    }

    #[test]
    fn test_every_render_mints_new_instance() {
        let mut renderer = SandboxRenderer::default();
        let first = renderer.render(&tree()).instance_id().cloned().unwrap();
        let second = renderer.render(&tree()).instance_id().cloned().unwrap();
        assert_ne!(first, second);
        assert_eq!(renderer.live_instance(), Some(&second));
        assert_eq!(renderer.render_count(), 2);
    }

    #[test]
    fn test_missing_markup_renders_placeholder() {
        let mut renderer = SandboxRenderer::default();
        let tree = FileTree::new(vec![FileNode::file("styles.css", "body {}")]);
        let rendered = renderer.render(&tree);

        assert!(rendered.is_placeholder());
        assert!(!rendered.document().contains("<script"));
        assert!(renderer.live_instance().is_none());
    }

    #[test]
    fn test_missing_data_document_is_served_as_empty_object() {
        let tree = FileTree::new(vec![
            FileNode::file("index.html", "<main></main>"),
            FileNode::file("script.js", r#"fetch("data.json");"#),
        ]);
        let mut renderer = SandboxRenderer::default();
        let doc = renderer.render(&tree).document().to_string();
        assert!(doc.contains(r#"var files = { "data.json": "{}" };"#));
    }

    #[test]
    fn test_content_security_policy_is_injected() {
        let policy = SandboxPolicy::default().with_content_security_policy("default-src 'none'");
        let mut renderer = SandboxRenderer::new(policy);
        let doc = renderer.render(&tree()).document().to_string();
        assert!(doc.contains(
            r#"<meta http-equiv="Content-Security-Policy" content="default-src 'none'">"#
        ));
    }
}
