use std::path::PathBuf;

use anyhow::{Context, Result};
use sitesmith_core::preview::PreviewSession;

use super::App;

const DEFAULT_PREVIEW_FILE: &str = "preview.html";

/// Renders the active project and writes a host page that runs it in a
/// sandboxed iframe.
pub async fn write(app: &App, out: Option<PathBuf>) -> Result<()> {
    let project = app.active_project().await?;

    let mut session = PreviewSession::new(app.config.preview.sandbox_policy());
    if session.render(&project.working_tree()).is_placeholder() {
        println!("index.html is missing; the preview shows a placeholder.");
    }
    let page = session
        .host_page(&project.name)
        .context("Nothing was rendered")?;

    let path = out.unwrap_or_else(|| PathBuf::from(DEFAULT_PREVIEW_FILE));
    tokio::fs::write(&path, page)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Preview written to {}", path.display());
    Ok(())
}
