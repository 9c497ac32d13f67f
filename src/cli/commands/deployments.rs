use anyhow::{bail, Result};

use super::{file_name, or_dash, print_json, print_page, read_text, CommandContext};
use crate::cli::DeploymentAction;
use crate::engine::types::{Deployment, DeploymentResource};

pub async fn execute(action: &DeploymentAction, ctx: &CommandContext) -> Result<()> {
    let deployments = ctx.client.deployments();
    let credential = &ctx.credential;

    match action {
        DeploymentAction::List { page } => {
            let result = deployments.list(credential, (*page).into()).await?;
            print_page(&result, row);
        }
        DeploymentAction::Get { id } => print_json(&deployments.get(credential, id).await?)?,
        DeploymentAction::Resources { id } => {
            for resource in deployments.resources(credential, id).await? {
                println!("{resource}");
            }
        }
        DeploymentAction::Count => println!("{}", deployments.count(credential).await?),
        DeploymentAction::Deploy { name, files, json } => {
            let resources = files
                .iter()
                .map(|path| -> Result<DeploymentResource> {
                    Ok(DeploymentResource::new(file_name(path), read_text(path)?))
                })
                .collect::<Result<Vec<_>>>()?;
            let receipt = match (*json, resources.as_slice()) {
                (false, _) => deployments.deploy(credential, name, &resources).await?,
                (true, [resource]) => deployments.deploy_xml(credential, name, resource).await?,
                (true, _) => bail!("--json deploys exactly one BPMN file, got {}", resources.len()),
            };
            println!("📦 Deployed {} as {}", name, receipt.id);
        }
        DeploymentAction::Delete { id, cascade } => {
            deployments.delete(credential, id, *cascade).await?;
            println!("🗑️  Deleted deployment {id}");
        }
    }
    Ok(())
}

fn row(deployment: &Deployment) -> String {
    let deployed_at = deployment
        .deployed_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<40} {:<30} {:<17} {}",
        deployment.id,
        or_dash(deployment.name.as_deref()),
        deployed_at,
        or_dash(deployment.deployed_by.as_deref())
    )
}
