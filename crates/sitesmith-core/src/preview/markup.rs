//! Text transforms used when assembling the sandbox document.

use std::sync::OnceLock;

use regex::Regex;

fn wrapper_tags() -> &'static Regex {
    static WRAPPER_TAGS: OnceLock<Regex> = OnceLock::new();
    WRAPPER_TAGS.get_or_init(|| {
        Regex::new(r"(?i)<!DOCTYPE[^>]*>|</?html\b[^>]*>|</?body\b[^>]*>")
            .expect("wrapper tag pattern is valid")
    })
}

fn self_references() -> &'static Regex {
    static SELF_REFERENCES: OnceLock<Regex> = OnceLock::new();
    SELF_REFERENCES.get_or_init(|| {
        Regex::new(concat!(
            r#"(?is)<link\b[^>]*\bhref\s*=\s*["']?(?:\./)?styles\.css["']?[^>]*>"#,
            r#"|<script\b[^>]*\bsrc\s*=\s*["']?(?:\./)?script\.js["']?[^>]*>\s*</script\s*>"#
        ))
        .expect("self reference pattern is valid")
    })
}

fn closing_raw_text_tag() -> &'static Regex {
    static CLOSING: OnceLock<Regex> = OnceLock::new();
    CLOSING.get_or_init(|| {
        Regex::new(r"(?i)</(script|style)")
            .expect("closing tag pattern is valid")
    })
}

/// Removes `<!DOCTYPE>`, `<html>` and `<body>` open/close tags, keeping
/// everything between them verbatim.
pub(super) fn strip_document_wrapper(markup: &str) -> String {
    wrapper_tags().replace_all(markup, "").into_owned()
}

/// Drops `<link href="styles.css">` and `<script src="script.js">` tags.
///
/// The shell inlines both files; inside a srcdoc frame the relative URLs
/// would resolve against the host and fail to load.
pub(super) fn strip_bundle_references(markup: &str) -> String {
    self_references().replace_all(markup, "").into_owned()
}

/// Keeps text from terminating the `<script>`/`<style>` element it is
/// embedded in.
pub(super) fn escape_raw_text(text: &str) -> String {
    closing_raw_text_tag()
        .replace_all(text, r"<\/$1")
        .into_owned()
}

/// Escapes text for a double-quoted HTML attribute value or element text.
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// A JavaScript string literal safe to place inside a `<script>` element.
pub(super) fn js_string_literal(text: &str) -> String {
    let literal = serde_json::Value::String(text.to_string()).to_string();
    literal.replace("</", "<\\/").replace("<!--", "<\\!--")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_document_wrapper() {
        let markup = "<!doctype html>\n<HTML lang=\"en\"><body class=\"x\"><p>hi</p></BODY></html>";
        assert_eq!(strip_document_wrapper(markup), "\n<p>hi</p>");
    }

    #[test]
    fn test_strip_keeps_lookalike_tags() {
        let markup = "<bodyguard>x</bodyguard><htmlish/>";
        assert_eq!(strip_document_wrapper(markup), markup);
    }

    #[test]
    fn test_strip_bundle_references() {
        let markup = r#"<link rel="stylesheet" href="styles.css"><p>x</p><script src="./script.js"></script><script src="cdn.js"></script>"#;
        assert_eq!(
            strip_bundle_references(markup),
            r#"<p>x</p><script src="cdn.js"></script>"#
        );
    }

    #[test]
    fn test_escape_raw_text() {
        assert_eq!(
            escape_raw_text(r#"var s = "</script><script>";"#),
            r#"var s = "<\/script><script>";"#
        );
        assert_eq!(escape_raw_text("a { } </STYLE>"), r"a { } <\/STYLE>");
    }

    #[test]
    fn test_js_string_literal() {
        assert_eq!(js_string_literal("{\"a\":\"</script>\"}"), r#""{\"a\":\"<\/script>\"}""#);
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
    }
}
