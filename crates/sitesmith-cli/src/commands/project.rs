use std::path::PathBuf;

use anyhow::{Context, Result};
use sitesmith_infrastructure::SitesmithPaths;

use super::App;

pub async fn create(app: &App, name: Option<&str>) -> Result<()> {
    let project = app.usecase.create_project(name).await?;
    println!("Created {} ({})", project.name, project.id);
    Ok(())
}

pub async fn list(app: &App) -> Result<()> {
    let active = app.active_project().await?;
    for project in app.usecase.list_projects().await? {
        let marker = if project.id == active.id { "*" } else { " " };
        println!(
            "{marker} {}  {}  {} version(s)  updated {}",
            project.id,
            project.name,
            project.versions.len(),
            project.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub async fn open(app: &App, id: &str) -> Result<()> {
    let project = app.usecase.switch_project(id).await?;
    println!("Now working on {}", project.name);
    Ok(())
}

pub async fn rename(app: &App, id: &str, name: &str) -> Result<()> {
    let project = app.usecase.rename_project(id, name).await?;
    println!("Renamed to {}", project.name);
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<()> {
    match app.usecase.delete_project(id).await? {
        Some(next) => println!("Deleted. Now working on {} ({})", next.name, next.id),
        None => println!("Deleted."),
    }
    Ok(())
}

pub async fn history(app: &App) -> Result<()> {
    let project = app.active_project().await?;
    if project.versions.is_empty() {
        println!("{} has no versions yet.", project.name);
        return Ok(());
    }

    for (index, version) in project.versions.iter().enumerate() {
        let marker = if index == 0 { "*" } else { " " };
        println!(
            "{marker} {}  {}  {}",
            version.id,
            version.created_at.format("%Y-%m-%d %H:%M:%S"),
            version.change_summary.as_deref().unwrap_or_default()
        );
        println!("    {}", version.origin_prompt);
    }
    Ok(())
}

pub async fn restore(app: &App, version_id: &str) -> Result<()> {
    let project = app.active_project().await?;
    let project = app.usecase.restore_version(&project.id, version_id).await?;
    if let Some(head) = project.versions.head() {
        println!("Restored as version {}", head.id);
    }
    Ok(())
}

pub async fn export(app: &App, out: Option<PathBuf>) -> Result<()> {
    let project = app.active_project().await?;
    let dest_dir = out
        .or_else(|| app.config.export.directory.as_ref().map(PathBuf::from))
        .unwrap_or_else(SitesmithPaths::default_export_dir);

    let path = app
        .usecase
        .export_project(&project.id, &dest_dir)
        .await
        .context("Export failed")?;
    println!("Exported {}", path.display());
    Ok(())
}
