use anyhow::Result;

use super::{file_name, or_dash, parse_variables, print_json, print_page, read_text, CommandContext};
use crate::cli::DecisionAction;
use crate::engine::types::Decision;

pub async fn execute(action: &DecisionAction, ctx: &CommandContext) -> Result<()> {
    let decisions = ctx.client.decisions();
    let credential = &ctx.credential;

    match action {
        DecisionAction::List { page } => {
            print_page(&decisions.list(credential, (*page).into()).await?, row)
        }
        DecisionAction::Get { id } => print_json(&decisions.get(credential, id).await?)?,
        DecisionAction::GetByKey { key } => print_json(&decisions.get_by_key(credential, key).await?)?,
        DecisionAction::Xml { id } => println!("{}", decisions.xml(credential, id).await?),
        DecisionAction::Deploy {
            file,
            name,
            category,
        } => {
            let xml = read_text(file)?;
            let name = name.clone().unwrap_or_else(|| file_name(file));
            let receipt = decisions
                .deploy(credential, &name, &xml, category.as_deref())
                .await?;
            println!("📦 Deployed {name} as {}", receipt.id);
        }
        DecisionAction::DeleteDeployment { deployment_id } => {
            decisions.delete_deployment(credential, deployment_id).await?;
            println!("🗑️  Deleted decision deployment {deployment_id}");
        }
        DecisionAction::Execute { key, variables } => {
            let inputs = parse_variables(variables)?;
            let execution = decisions.execute_by_key(credential, key, &inputs).await?;
            print_json(&execution.result)?;
        }
        DecisionAction::Validate { file } => {
            let report = decisions.validate(credential, &read_text(file)?).await?;
            if report.valid {
                println!("✅ {} is valid", file.display());
            } else {
                println!("❌ {} is invalid", file.display());
            }
            for error in &report.errors {
                println!("   error: {error}");
            }
            for warning in &report.warnings {
                println!("   warning: {warning}");
            }
        }
    }
    Ok(())
}

fn row(decision: &Decision) -> String {
    format!(
        "{:<40} {:<28} v{:<4} {}",
        decision.id,
        decision.key,
        decision.version,
        or_dash(decision.name.as_deref())
    )
}
