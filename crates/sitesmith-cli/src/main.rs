use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sitesmith_infrastructure::SitesmithPaths;

mod commands;
mod logging;

use commands::App;

#[derive(Parser)]
#[command(name = "sitesmith")]
#[command(about = "sitesmith - build single-page websites by chatting with an AI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project and make it the active one
    New {
        /// Project name
        name: Option<String>,
    },
    /// List projects, newest first
    List,
    /// Make a project the active one
    Open { id: String },
    /// Rename a project
    Rename { id: String, name: String },
    /// Delete a project
    Delete { id: String },
    /// Ask the AI to build or change the website
    Prompt {
        text: String,
        /// Only ask for a plan; no code is written
        #[arg(long)]
        plan: bool,
    },
    /// Show the version history of the active project
    History,
    /// Republish an older version as the newest one
    Restore { version_id: String },
    /// Print the file tree of the active project
    Tree,
    /// Upload a file into the project's source folder
    AddFile { path: PathBuf },
    /// Remove a file or folder by id
    Rm { node_id: String },
    /// Replace a file's content with the content of a local file
    Edit { name: String, path: PathBuf },
    /// Write a sandboxed preview page
    Preview {
        /// Output HTML file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export the project as a zip archive
    Export {
        /// Destination directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = SitesmithPaths::from_env()
        .logs_dir()
        .context("Failed to resolve the log directory")?;
    let _guard = logging::init(&log_dir)?;

    let app = App::bootstrap().await?;

    match cli.command {
        Commands::New { name } => commands::project::create(&app, name.as_deref()).await?,
        Commands::List => commands::project::list(&app).await?,
        Commands::Open { id } => commands::project::open(&app, &id).await?,
        Commands::Rename { id, name } => commands::project::rename(&app, &id, &name).await?,
        Commands::Delete { id } => commands::project::delete(&app, &id).await?,
        Commands::Prompt { text, plan } => commands::prompt::send(&app, &text, plan).await?,
        Commands::History => commands::project::history(&app).await?,
        Commands::Restore { version_id } => commands::project::restore(&app, &version_id).await?,
        Commands::Tree => commands::files::tree(&app).await?,
        Commands::AddFile { path } => commands::files::add_file(&app, &path).await?,
        Commands::Rm { node_id } => commands::files::remove(&app, &node_id).await?,
        Commands::Edit { name, path } => commands::files::edit(&app, &name, &path).await?,
        Commands::Preview { out } => commands::preview::write(&app, out).await?,
        Commands::Export { out } => commands::project::export(&app, out).await?,
    }

    Ok(())
}
