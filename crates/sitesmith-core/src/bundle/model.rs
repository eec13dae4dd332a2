use serde::{Deserialize, Serialize};

use crate::file_tree::FileNode;

/// Data document used when a stored bundle predates the data file.
pub const DEFAULT_DATA_DOCUMENT: &str = "{}";

/// One of the four fixed-name files every project has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalFile {
    Markup,
    Style,
    Script,
    DataDocument,
}

impl CanonicalFile {
    /// Display order.
    pub const ALL: [CanonicalFile; 4] = [
        CanonicalFile::Markup,
        CanonicalFile::Style,
        CanonicalFile::Script,
        CanonicalFile::DataDocument,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Markup => "index.html",
            Self::Style => "styles.css",
            Self::Script => "script.js",
            Self::DataDocument => "data.json",
        }
    }

    /// Exact, case-sensitive match on the file name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.file_name() == name)
    }

    /// Stable node id used when the codec builds a tree.
    pub fn node_id(self) -> &'static str {
        match self {
            Self::Markup => "index-html",
            Self::Style => "styles-css",
            Self::Script => "script-js",
            Self::DataDocument => "data-json",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Markup => "text/html",
            Self::Style => "text/css",
            Self::Script => "text/javascript",
            Self::DataDocument => "application/json",
        }
    }

    /// Content substituted for an empty field when building a tree.
    pub fn default_content(self) -> &'static str {
        match self {
            Self::Markup => concat!(
                "<!DOCTYPE html>\n",
                "<html lang=\"en\"><head><meta charset=\"UTF-8\"><title>My App</title>",
                "<link rel=\"stylesheet\" href=\"styles.css\"></head>",
                "<body><h1>Hello World</h1><script src=\"script.js\"></script></body></html>"
            ),
            Self::Style => "/* Your styles here */\nbody { font-family: system-ui, sans-serif; }",
            Self::Script => "// Your JavaScript here\nconsole.log(\"Ready!\");",
            Self::DataDocument => {
                "{\n  \"siteTitle\": \"My AI App\",\n  \"welcome\": \"Edit me in data.json!\"\n}"
            }
        }
    }
}

impl std::fmt::Display for CanonicalFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// The four canonical file contents plus any extra files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBundle {
    pub markup: String,
    pub style: String,
    pub script: String,
    #[serde(default = "default_data_document")]
    pub data_document: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_files: Vec<FileNode>,
}

fn default_data_document() -> String {
    DEFAULT_DATA_DOCUMENT.to_string()
}

impl CodeBundle {
    pub fn new(
        markup: impl Into<String>,
        style: impl Into<String>,
        script: impl Into<String>,
        data_document: impl Into<String>,
    ) -> Self {
        Self {
            markup: markup.into(),
            style: style.into(),
            script: script.into(),
            data_document: data_document.into(),
            extra_files: Vec::new(),
        }
    }

    pub fn with_extra_files(mut self, extra_files: Vec<FileNode>) -> Self {
        self.extra_files = extra_files;
        self
    }

    pub fn get(&self, kind: CanonicalFile) -> &str {
        match kind {
            CanonicalFile::Markup => &self.markup,
            CanonicalFile::Style => &self.style,
            CanonicalFile::Script => &self.script,
            CanonicalFile::DataDocument => &self.data_document,
        }
    }

    pub fn set(&mut self, kind: CanonicalFile, content: impl Into<String>) {
        let slot = match kind {
            CanonicalFile::Markup => &mut self.markup,
            CanonicalFile::Style => &mut self.style,
            CanonicalFile::Script => &mut self.script,
            CanonicalFile::DataDocument => &mut self.data_document,
        };
        *slot = content.into();
    }

    /// Canonical files whose content differs from `previous`.
    ///
    /// With no previous bundle every canonical file counts as changed.
    pub fn changed_files(&self, previous: Option<&CodeBundle>) -> Vec<CanonicalFile> {
        CanonicalFile::ALL
            .into_iter()
            .filter(|kind| previous.is_none_or(|prev| prev.get(*kind) != self.get(*kind)))
            .collect()
    }
}
