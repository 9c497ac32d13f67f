use anyhow::{Context, Result};
use std::path::Path;

use super::{or_dash, parse_variables, print_json, print_page, read_text, CommandContext};
use crate::cli::FormAction;
use crate::engine::types::{Form, FormDraft};

pub async fn execute(action: &FormAction, ctx: &CommandContext) -> Result<()> {
    let forms = ctx.client.forms();
    let credential = &ctx.credential;

    match action {
        FormAction::List { page } => print_page(&forms.list(credential, (*page).into()).await?, row),
        FormAction::Get { id } => print_json(&forms.get(credential, id).await?)?,
        FormAction::GetByKey { key } => {
            for form in forms.get_by_key(credential, key).await? {
                println!("{}", row(&form));
            }
        }
        FormAction::Latest { key } => print_json(&forms.latest(credential, key).await?)?,
        FormAction::ForTask { task_id } => print_json(&forms.for_task(credential, task_id).await?)?,
        FormAction::Create {
            key,
            name,
            description,
            schema,
        } => {
            let draft = draft(key, name, description.as_deref(), schema)?;
            let form = forms.create(credential, &draft).await?;
            println!("📝 Created form {} ({})", form.id, form.key);
        }
        FormAction::Update {
            id,
            key,
            name,
            description,
            schema,
        } => {
            let draft = draft(key, name, description.as_deref(), schema)?;
            let form = forms.update(credential, id, &draft).await?;
            println!("📝 Updated form {} (v{})", form.id, form.version);
        }
        FormAction::Delete { id } => {
            forms.delete(credential, id).await?;
            println!("🗑️  Deleted form {id}");
        }
        FormAction::Publish { id } => {
            let form = forms.publish(credential, id).await?;
            println!("📢 Published {} as v{}", form.key, form.version);
        }
        FormAction::Submit { id, data } => {
            let submission = forms.submit(credential, id, &parse_variables(data)?).await?;
            println!("✅ Submitted {}", or_dash(submission.id.as_deref()));
        }
        FormAction::Validate { id, data } => {
            let report = forms.validate(credential, id, &parse_variables(data)?).await?;
            if report.valid {
                println!("✅ Data is valid for form {id}");
            } else {
                println!("❌ Data is invalid for form {id}");
                for error in &report.errors {
                    println!("   {error}");
                }
            }
        }
    }
    Ok(())
}

fn draft(key: &str, name: &str, description: Option<&str>, schema: &Path) -> Result<FormDraft> {
    let schema = serde_json::from_str(&read_text(schema)?)
        .with_context(|| format!("{} is not valid JSON", schema.display()))?;
    Ok(FormDraft {
        key: key.to_string(),
        name: name.to_string(),
        description: description.map(str::to_string),
        schema,
    })
}

fn row(form: &Form) -> String {
    format!(
        "{:<40} {:<28} v{:<4} {}",
        form.id,
        form.key,
        form.version,
        or_dash(form.name.as_deref())
    )
}
