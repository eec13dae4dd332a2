use std::path::Path;

use anyhow::{Context, Result, bail};
use sitesmith_core::bundle::SOURCE_FOLDER_ID;
use sitesmith_core::file_tree::{Explorer, FileNode, FileTree};
use sitesmith_infrastructure::upload::file_node_from_path;

use super::App;

pub async fn tree(app: &App) -> Result<()> {
    let project = app.active_project().await?;
    print!("{}", render_tree(&project.working_tree()));
    Ok(())
}

pub async fn add_file(app: &App, path: &Path) -> Result<()> {
    let project = app.active_project().await?;
    let node = file_node_from_path(path).await?;
    let name = node.name().to_string();

    let mut explorer = Explorer::new(project.working_tree());
    if !explorer.add_node(node, Some(SOURCE_FOLDER_ID)) {
        bail!("Could not add {name}: duplicate id");
    }
    commit(app, &project.id, &explorer).await?;
    println!("Added {name}");
    Ok(())
}

pub async fn remove(app: &App, node_id: &str) -> Result<()> {
    let project = app.active_project().await?;
    let mut explorer = Explorer::new(project.working_tree());
    if !explorer.delete_node(node_id) {
        println!("Nothing removed: {node_id} is unknown or protected.");
        return Ok(());
    }
    commit(app, &project.id, &explorer).await?;
    println!("Removed {node_id}");
    Ok(())
}

pub async fn edit(app: &App, name: &str, path: &Path) -> Result<()> {
    let project = app.active_project().await?;
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut explorer = Explorer::new(project.working_tree());
    let Some(file_id) = explorer
        .tree()
        .find_file_by_name(name)
        .map(|file| file.id.clone())
    else {
        bail!("No file named {name} in the project");
    };
    if !explorer.update_file_content(&file_id, content) {
        println!("{name} is unchanged.");
        return Ok(());
    }
    commit(app, &project.id, &explorer).await?;
    println!("Updated {name}");
    Ok(())
}

async fn commit(app: &App, project_id: &str, explorer: &Explorer) -> Result<()> {
    let (project, _) = app.usecase.commit_tree(project_id, explorer.tree()).await?;
    if let Some(head) = project.versions.head() {
        tracing::info!(
            "[Files] Saved version {} ({})",
            head.id,
            head.change_summary.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}

fn render_tree(tree: &FileTree) -> String {
    let mut out = String::new();
    for node in tree.roots() {
        render_node(node, 0, &mut out);
    }
    out
}

fn render_node(node: &FileNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let suffix = if node.is_folder() { "/" } else { "" };
    let lock = if FileTree::is_protected(node) { " [protected]" } else { "" };
    out.push_str(&format!("{indent}{}{suffix}  ({}){lock}\n", node.name(), node.id()));
    for child in node.children() {
        render_node(child, depth + 1, out);
    }
}
