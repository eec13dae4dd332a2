use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// The failure channel a preview error arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreviewErrorKind {
    /// Uncaught exception, or a throw from the script's top level.
    #[serde(rename = "runtime")]
    Runtime,
    /// Unhandled promise rejection.
    #[serde(rename = "promise")]
    RejectedPromise,
    /// `console.error` called by the page.
    #[serde(rename = "console")]
    ConsoleError,
    /// An image, script or stylesheet that failed to load.
    #[serde(rename = "resource")]
    ResourceLoadFailure,
}

impl PreviewErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Runtime => "Runtime Error",
            Self::RejectedPromise => "Promise Rejection",
            Self::ConsoleError => "Console Error",
            Self::ResourceLoadFailure => "Resource Error",
        }
    }
}

/// A failure reported by the sandboxed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewError {
    /// Fingerprint of the full report; equal reports share an id.
    pub id: String,
    pub kind: PreviewErrorKind,
    pub message: String,
    pub source_file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub stack: Option<String>,
}

impl PreviewError {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// `file:line:column`, as much of it as is known.
    pub fn location(&self) -> Option<String> {
        let file = self.source_file.as_deref()?;
        let mut location = file.to_string();
        if let Some(line) = self.line {
            let _ = write!(location, ":{line}");
            if let Some(column) = self.column {
                let _ = write!(location, ":{column}");
            }
        }
        Some(location)
    }

    /// Plain-text rendering for copying into a bug report.
    ///
    /// `index` is zero-based and shown as `[index + 1]`.
    pub fn format_report(&self, index: Option<usize>) -> String {
        let mut out = String::new();
        if let Some(index) = index {
            let _ = write!(out, "[{}] ", index + 1);
        }
        let _ = write!(out, "{}\nMessage: {}", self.label(), self.message);
        if let Some(location) = self.location() {
            let _ = write!(out, "\nFile: {location}");
        }
        if let Some(stack) = self.stack.as_deref().filter(|stack| !stack.is_empty()) {
            let _ = write!(out, "\nStack:\n{stack}");
        }
        out
    }
}
