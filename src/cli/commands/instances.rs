use anyhow::{anyhow, Result};

use super::{or_dash, parse_variables, print_json, print_page, CommandContext};
use crate::cli::InstanceAction;
use crate::engine::types::{InstanceStatus, ProcessInstance};
use crate::engine::InstanceFilter;
use crate::lifecycle::InstanceTransition;

pub async fn execute(action: &InstanceAction, ctx: &CommandContext) -> Result<()> {
    let instances = ctx.client.instances();
    let credential = &ctx.credential;

    match action {
        InstanceAction::List {
            page,
            status,
            process_key,
        } => {
            let status = status
                .as_deref()
                .map(|s| s.parse::<InstanceStatus>().map_err(|e| anyhow!(e)))
                .transpose()?;
            let filter = InstanceFilter {
                status,
                process_key: process_key.clone(),
            };
            let result = instances.list(credential, (*page).into(), &filter).await?;
            print_page(&result, row);
        }
        InstanceAction::Get { id } => {
            let instance = instances.get(credential, id).await?;
            println!("{}", row(&instance));
        }
        InstanceAction::Count => println!("{}", instances.count(credential).await?),
        InstanceAction::Variables { id } => print_json(&instances.variables(credential, id).await?)?,
        InstanceAction::SetVariables { id, variables } => {
            let variables = parse_variables(variables)?;
            instances.set_variables(credential, id, &variables).await?;
            println!("✅ Updated {} variable(s) on {id}", variables.len());
        }
        InstanceAction::History { id } => {
            for entry in instances.history(credential, id).await? {
                println!(
                    "{:<25} {:<16} {}",
                    or_dash(entry.activity_name.as_deref().or(entry.activity_id.as_deref())),
                    or_dash(entry.activity_type.as_deref()),
                    or_dash(entry.assignee.as_deref())
                );
            }
        }
        InstanceAction::Suspend { id } => report(ctx.coordinator().suspend(credential, id).await?),
        InstanceAction::Activate { id } => report(ctx.coordinator().activate(credential, id).await?),
        InstanceAction::Terminate { id, reason } => report(
            ctx.coordinator()
                .terminate(credential, id, reason.as_deref())
                .await?,
        ),
    }
    Ok(())
}

fn report(transition: InstanceTransition) {
    println!(
        "🔄 {}: {} → {}",
        transition.instance_id, transition.from, transition.to
    );
}

fn row(instance: &ProcessInstance) -> String {
    format!(
        "{:<40} {:<10} {:<28} {}",
        instance.id,
        instance.status(),
        or_dash(instance.process_definition_key.as_deref()),
        or_dash(instance.business_key.as_deref())
    )
}
