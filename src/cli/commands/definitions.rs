use anyhow::Result;

use super::{or_dash, parse_variables, print_json, print_page, CommandContext};
use crate::cli::DefinitionAction;
use crate::engine::types::{ProcessDefinition, StartProcessRequest};
use crate::engine::DefinitionFilter;

pub async fn execute(action: &DefinitionAction, ctx: &CommandContext) -> Result<()> {
    let definitions = ctx.client.definitions();
    let credential = &ctx.credential;

    match action {
        DefinitionAction::List {
            page,
            key_like,
            latest,
        } => {
            let filter = DefinitionFilter {
                key_like: key_like.clone(),
                latest_only: *latest,
            };
            let result = definitions.list(credential, (*page).into(), &filter).await?;
            print_page(&result, row);
        }
        DefinitionAction::Get { id } => print_json(&definitions.get(credential, id).await?)?,
        DefinitionAction::GetByKey { key } => {
            print_json(&definitions.get_by_key(credential, key).await?)?
        }
        DefinitionAction::Xml { id } => println!("{}", definitions.xml(credential, id).await?),
        DefinitionAction::Count => println!("{}", definitions.count(credential).await?),
        DefinitionAction::Start {
            key,
            business_key,
            variables,
        } => {
            let request = StartProcessRequest {
                variables: parse_variables(variables)?,
                business_key: business_key.clone(),
            };
            let instance = definitions.start_by_key(credential, key, &request).await?;
            println!("🚀 Started {} ({})", instance.id, instance.status());
        }
    }
    Ok(())
}

fn row(definition: &ProcessDefinition) -> String {
    format!(
        "{:<40} {:<28} v{:<4} {}",
        definition.id,
        definition.key,
        definition.version,
        or_dash(definition.name.as_deref())
    )
}
