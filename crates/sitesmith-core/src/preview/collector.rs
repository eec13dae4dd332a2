use std::collections::HashSet;

use super::error::PreviewError;

/// Ordered, de-duplicated errors of the current render.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Vec<PreviewError>,
    seen: HashSet<String>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `error` unless one with the same fingerprint is already held.
    ///
    /// Returns true if the error was new.
    pub fn add(&mut self, error: PreviewError) -> bool {
        if !self.seen.insert(error.id.clone()) {
            return false;
        }
        self.errors.push(error);
        true
    }

    pub fn errors(&self) -> &[PreviewError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.seen.clear();
    }

    /// Every error as one copyable text block.
    pub fn report(&self) -> String {
        let body = self
            .errors
            .iter()
            .enumerate()
            .map(|(index, error)| error.format_report(Some(index)))
            .collect::<Vec<_>>()
            .join("\n\n----------------------\n\n");
        format!("=== PREVIEW ERRORS ({}) ===\n\n{}", self.errors.len(), body)
    }
}
