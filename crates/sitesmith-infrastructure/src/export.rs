//! Zip export of a project file tree.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use tokio::fs;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use sitesmith_core::error::{Result, SitesmithError};
use sitesmith_core::file_tree::{FileEntry, FileNode, FileTree};

fn zip_error(e: impl std::fmt::Display) -> SitesmithError {
    SitesmithError::serialization("zip", e.to_string())
}

/// Turns a project name into a safe archive file stem.
pub fn archive_stem(project_name: &str) -> String {
    let stem: String = project_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.').trim();
    if stem.is_empty() {
        "project".to_string()
    } else {
        stem.to_string()
    }
}

/// Bytes to store for a file: data URIs are decoded back to binary.
fn file_bytes(file: &FileEntry) -> Vec<u8> {
    if let Some(rest) = file.content.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(',') {
            if header.ends_with(";base64") {
                match BASE64_STANDARD.decode(payload.trim()) {
                    Ok(bytes) => return bytes,
                    Err(e) => tracing::warn!(
                        "[ZipExporter] {} holds an undecodable data URI, storing as text: {}",
                        file.name,
                        e
                    ),
                }
            }
        }
    }
    file.content.as_bytes().to_vec()
}

/// Writes file trees as zip archives, folders as directory entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExporter;

impl ZipExporter {
    pub fn new() -> Self {
        Self
    }

    /// Builds the archive in memory.
    pub fn build_archive(&self, tree: &FileTree) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);

            let mut written = HashSet::new();
            for node in tree.roots() {
                write_node(&mut zip, node, "", options, &mut written)?;
            }
            zip.finish().map_err(zip_error)?;
        }
        Ok(cursor.into_inner())
    }

    /// Writes `{project name}.zip` into `dest_dir` and returns its path.
    pub async fn export_tree(
        &self,
        tree: &FileTree,
        project_name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let bytes = self.build_archive(tree)?;

        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| SitesmithError::io(format!("Failed to create export directory: {}", e)))?;
        let path = dest_dir.join(format!("{}.zip", archive_stem(project_name)));
        fs::write(&path, &bytes)
            .await
            .map_err(|e| SitesmithError::io(format!("Failed to write archive: {}", e)))?;

        tracing::info!(
            "[ZipExporter] Exported {} ({} bytes)",
            path.display(),
            bytes.len()
        );
        Ok(path)
    }
}

/// First free entry path: `a.txt`, then `a (2).txt`, `a (3).txt`, ...
fn unique_file_path(written: &HashSet<String>, prefix: &str, name: &str) -> String {
    let path = format!("{}{}", prefix, name);
    if !written.contains(&path) {
        return path;
    }
    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    (2..)
        .map(|n| format!("{}{} ({}){}", prefix, stem, n, extension))
        .find(|candidate| !written.contains(candidate))
        .unwrap_or(path)
}

fn write_node<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    node: &FileNode,
    prefix: &str,
    options: SimpleFileOptions,
    written: &mut HashSet<String>,
) -> Result<()> {
    match node {
        FileNode::File(file) => {
            let path = unique_file_path(written, prefix, &file.name);
            if path != format!("{}{}", prefix, file.name) {
                tracing::debug!("[ZipExporter] Duplicate name {}, stored as {}", file.name, path);
            }
            zip.start_file(path.as_str(), options).map_err(zip_error)?;
            zip.write_all(&file_bytes(file))
                .map_err(|e| SitesmithError::io(e.to_string()))?;
            written.insert(path);
        }
        FileNode::Folder(folder) => {
            // same-named sibling folders share one directory entry
            let dir = format!("{}{}/", prefix, folder.name);
            if written.insert(dir.clone()) {
                zip.add_directory(dir.as_str(), options).map_err(zip_error)?;
            }
            for child in &folder.children {
                write_node(zip, child, &dir, options, written)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesmith_core::bundle::{CodeBundle, SOURCE_FOLDER_ID, to_tree};
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn tree() -> FileTree {
        to_tree(&CodeBundle::new(
            "<!DOCTYPE html><html><body>hi</body></html>",
            "body {}",
            "console.log(1);",
            "{}",
        ))
        .insert(
            FileNode::File(FileEntry {
                id: "logo".to_string(),
                name: "logo.png".to_string(),
                content: format!(
                    "data:image/png;base64,{}",
                    BASE64_STANDARD.encode([137u8, 80, 78, 71])
                ),
                media_type: Some("image/png".to_string()),
            }),
            Some(SOURCE_FOLDER_ID),
        )
    }

    #[test]
    fn test_archive_mirrors_tree() {
        let bytes = ZipExporter::new().build_archive(&tree()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        for expected in [
            "my-project/",
            "my-project/src/",
            "my-project/src/index.html",
            "my-project/src/data.json",
            "my-project/src/logo.png",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }

        let mut html = String::new();
        archive
            .by_name("my-project/src/index.html")
            .unwrap()
            .read_to_string(&mut html)
            .unwrap();
        assert!(html.contains("<body>hi</body>"));

        let mut logo = Vec::new();
        archive
            .by_name("my-project/src/logo.png")
            .unwrap()
            .read_to_end(&mut logo)
            .unwrap();
        assert_eq!(logo, vec![137u8, 80, 78, 71]);
    }

    #[test]
    fn test_duplicate_names_get_numbered_entries() {
        let tree = tree()
            .insert(FileNode::file_with_id("a1", "a.txt", "one"), Some(SOURCE_FOLDER_ID))
            .insert(FileNode::file_with_id("a2", "a.txt", "two"), Some(SOURCE_FOLDER_ID))
            .insert(FileNode::file_with_id("a3", "a.txt", "three"), Some(SOURCE_FOLDER_ID));
        let bytes = ZipExporter::new().build_archive(&tree).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        for (entry, expected) in [
            ("my-project/src/a.txt", "one"),
            ("my-project/src/a (2).txt", "two"),
            ("my-project/src/a (3).txt", "three"),
        ] {
            let mut text = String::new();
            archive
                .by_name(entry)
                .unwrap()
                .read_to_string(&mut text)
                .unwrap();
            assert_eq!(text, expected);
        }
    }

    #[test]
    fn test_unique_file_path_without_extension() {
        let written: HashSet<String> = ["src/README".to_string()].into_iter().collect();
        assert_eq!(unique_file_path(&written, "src/", "README"), "src/README (2)");
        assert_eq!(unique_file_path(&written, "src/", ".env"), "src/.env");
    }

    #[tokio::test]
    async fn test_export_named_after_project() {
        let temp_dir = TempDir::new().unwrap();
        let path = ZipExporter::new()
            .export_tree(&tree(), "My Site", temp_dir.path())
            .await
            .unwrap();
        assert_eq!(path, temp_dir.path().join("My Site.zip"));
        assert!(path.exists());
    }

    #[test]
    fn test_archive_stem() {
        assert_eq!(archive_stem("Portfolio"), "Portfolio");
        assert_eq!(archive_stem("a/b:c"), "a_b_c");
        assert_eq!(archive_stem("  "), "project");
        assert_eq!(archive_stem(".."), "project");
    }
}
