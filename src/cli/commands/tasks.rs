use anyhow::{Context, Result};

use super::{file_name, or_dash, parse_variables, print_json, print_page, CommandContext};
use crate::cli::TaskAction;
use crate::engine::types::Task;
use crate::engine::TaskFilter;
use crate::lifecycle::TaskTransition;

pub async fn execute(action: &TaskAction, ctx: &CommandContext) -> Result<()> {
    let tasks = ctx.client.tasks();
    let credential = &ctx.credential;

    match action {
        TaskAction::List {
            page,
            assignee,
            candidate_user,
            process_instance_id,
            name_like,
            unassigned,
        } => {
            let filter = TaskFilter {
                assignee: assignee.clone(),
                candidate_user: candidate_user.clone(),
                process_instance_id: process_instance_id.clone(),
                name_like: name_like.clone(),
                unassigned: *unassigned,
            };
            print_page(&tasks.list(credential, (*page).into(), &filter).await?, row);
        }
        TaskAction::Inbox { page } => print_page(&tasks.inbox(credential, (*page).into()).await?, row),
        TaskAction::Claimable { page } => {
            print_page(&tasks.claimable(credential, (*page).into()).await?, row)
        }
        TaskAction::Get { id } => print_json(&tasks.get(credential, id).await?)?,
        TaskAction::Variables { id } => print_json(&tasks.variables(credential, id).await?)?,
        TaskAction::SetVariables { id, variables } => {
            let variables = parse_variables(variables)?;
            tasks.set_variables(credential, id, &variables).await?;
            println!("✅ Updated {} variable(s) on task {id}", variables.len());
        }
        TaskAction::Claim { id } => report(ctx.coordinator().claim(credential, id).await?),
        TaskAction::Unclaim { id } => report(ctx.coordinator().unclaim(credential, id).await?),
        TaskAction::Complete { id, variables } => {
            let variables = parse_variables(variables)?;
            report(ctx.coordinator().complete(credential, id, &variables).await?)
        }
        TaskAction::Comments { id } => {
            for comment in tasks.comments(credential, id).await? {
                println!("💬 {}: {}", or_dash(comment.author.as_deref()), comment.message);
            }
        }
        TaskAction::Comment { id, message } => {
            let comment = tasks.add_comment(credential, id, message).await?;
            println!("💬 Added comment {}", or_dash(comment.id.as_deref()));
        }
        TaskAction::Attachments { id } => {
            for attachment in tasks.attachments(credential, id).await? {
                println!(
                    "📎 {:<36} {}",
                    attachment.id,
                    or_dash(attachment.name.as_deref())
                );
            }
        }
        TaskAction::Attach { id, file } => {
            let bytes = tokio::fs::read(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let attachment = tasks
                .upload_attachment(credential, id, &file_name(file), bytes)
                .await?;
            println!("📎 Uploaded {}", attachment.id);
        }
    }
    Ok(())
}

fn report(transition: TaskTransition) {
    let assignee = transition
        .task
        .as_ref()
        .and_then(|task| task.current_assignee())
        .map(|user| format!(" ({user})"))
        .unwrap_or_default();
    println!(
        "🔄 {}: {} → {}{assignee}",
        transition.task_id, transition.from, transition.to
    );
}

fn row(task: &Task) -> String {
    format!(
        "{:<40} {:<30} {:<8} {:<14} {}",
        task.id,
        or_dash(task.name.as_deref()),
        task.lifecycle_status(),
        or_dash(task.current_assignee()),
        or_dash(task.process_instance_id.as_deref())
    )
}
