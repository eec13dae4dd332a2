//! Parsing of sectioned model output.
//!
//! Code responses list files under marker lines:
//!
//! ```text
//! --- data.json ---
//! {...}
//! --- index.html ---
//! <!DOCTYPE html>...
//! ```
//!
//! A section runs until the next marker or the end of the text. Each
//! section may be wrapped in a Markdown code fence, which is removed.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use sitesmith_core::bundle::{CanonicalFile, CodeBundle};
use sitesmith_core::generation::GenerationError;

fn section_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*---[ \t]*(data\.json|index\.html|styles\.css|script\.js)[ \t]*---[ \t]*\r?$")
            .expect("section marker pattern is valid")
    })
}

fn fenced_block() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?is)```(?:json|html|css|javascript|js)?[ \t]*\r?\n?(.*?)\r?\n?```")
            .expect("code fence pattern is valid")
    })
}

/// Removes a Markdown code fence around `text`, keeping its body.
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }
    match fenced_block().captures(text) {
        Some(captures) => captures
            .get(1)
            .map(|body| body.as_str().trim().to_string())
            .unwrap_or_default(),
        None => text.trim().to_string(),
    }
}

/// Cleans plan prose: fenced blocks are dropped entirely.
pub fn clean_plan(text: &str) -> String {
    fenced_block().replace_all(text, "").trim().to_string()
}

/// Blank sections and echoed template hints such as
/// `[if updated, complete HTML]` or `(unchanged)`.
fn is_placeholder(content: &str) -> bool {
    let lower = content.trim().to_ascii_lowercase();
    let bracketed = (lower.starts_with('[') && lower.ends_with(']'))
        || (lower.starts_with('(') && lower.ends_with(')'));
    let inner = if bracketed {
        lower[1..lower.len() - 1].trim()
    } else {
        lower.as_str()
    };
    lower.is_empty()
        || matches!(inner, "unchanged" | "no changes" | "no change")
        || (bracketed && inner.starts_with("if updated"))
}

/// Files found in a sectioned response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSections {
    files: BTreeMap<CanonicalFile, String>,
}

impl ParsedSections {
    pub fn get(&self, kind: CanonicalFile) -> Option<&str> {
        self.files.get(&kind).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = CanonicalFile> + '_ {
        self.files.keys().copied()
    }

    /// Requires all four files and builds a fresh bundle from them.
    pub fn into_full_bundle(self) -> Result<CodeBundle, GenerationError> {
        let missing: Vec<&str> = CanonicalFile::ALL
            .into_iter()
            .filter(|kind| !self.files.contains_key(kind))
            .map(CanonicalFile::file_name)
            .collect();
        if !missing.is_empty() {
            return Err(GenerationError::Parse(format!(
                "response is missing {}",
                missing.join(", ")
            )));
        }

        let mut bundle = CodeBundle::new("", "", "", "");
        for (kind, content) in self.files {
            bundle.set(kind, content);
        }
        Ok(bundle)
    }

    /// Overlays the parsed files on `current`; everything else, extra files
    /// included, is kept.
    pub fn merge_into(self, current: &CodeBundle) -> CodeBundle {
        let mut merged = current.clone();
        for (kind, content) in self.files {
            tracing::debug!("[ResponseParser] {} updated", kind);
            merged.set(kind, content);
        }
        merged
    }
}

/// Splits a response into its file sections.
///
/// Repeated markers keep the first occurrence. Empty or placeholder sections
/// are treated as absent.
pub fn parse_sections(response: &str) -> ParsedSections {
    let markers: Vec<(CanonicalFile, usize, usize)> = section_marker()
        .captures_iter(response)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let kind = CanonicalFile::from_name(captures.get(1)?.as_str())?;
            Some((kind, whole.start(), whole.end()))
        })
        .collect();

    let mut files = BTreeMap::new();
    for (index, (kind, _, body_start)) in markers.iter().enumerate() {
        let body_end = markers
            .get(index + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(response.len());
        let content = strip_code_fences(&response[*body_start..body_end]);
        if is_placeholder(&content) {
            continue;
        }
        files.entry(*kind).or_insert(content);
    }
    ParsedSections { files }
}
