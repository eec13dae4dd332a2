//! Turning uploaded files into tree nodes.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use tokio::fs;

use sitesmith_core::error::{Result, SitesmithError};
use sitesmith_core::file_tree::{FileEntry, FileNode};
use uuid::Uuid;

/// Infers the MIME type from a filename extension.
fn infer_mime_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

/// Builds a file node for uploaded bytes.
///
/// Images are kept as a base64 `data:` URI with their media type; anything
/// else is read as UTF-8 text, replacing invalid sequences.
pub fn file_node_from_upload(name: &str, bytes: &[u8]) -> FileNode {
    let mime = infer_mime_type(name);
    let (content, media_type) = if mime.starts_with("image/") {
        let uri = format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes));
        (uri, Some(mime))
    } else {
        (String::from_utf8_lossy(bytes).into_owned(), None)
    };

    FileNode::File(FileEntry {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        content,
        media_type,
    })
}

/// Reads a file from disk and builds its node, named after the file.
pub async fn file_node_from_path(path: &Path) -> Result<FileNode> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SitesmithError::io(format!("Not a file path: {}", path.display())))?;
    let bytes = fs::read(path)
        .await
        .map_err(|e| SitesmithError::io(format!("Failed to read {}: {}", path.display(), e)))?;

    tracing::debug!("[Upload] Read {} ({} bytes)", name, bytes.len());
    Ok(file_node_from_upload(name, &bytes))
}
