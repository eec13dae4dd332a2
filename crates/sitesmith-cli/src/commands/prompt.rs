use anyhow::Result;
use sitesmith_application::SendOutcome;
use sitesmith_core::generation::GenerationMode;

use super::App;

pub async fn send(app: &App, text: &str, plan: bool) -> Result<()> {
    let project = app.active_project().await?;
    let mode = if plan {
        GenerationMode::Plan
    } else {
        GenerationMode::Code
    };

    match app.usecase.send_message(&project.id, text, mode).await? {
        SendOutcome::Ignored => println!("Nothing to send."),
        SendOutcome::Planned(project) | SendOutcome::Updated { project, .. } => {
            if let Some(reply) = project.chat.last() {
                println!("{}", reply.content);
            }
        }
        SendOutcome::Failed { reason, .. } => eprintln!("AI Error: {reason}"),
    }
    Ok(())
}
