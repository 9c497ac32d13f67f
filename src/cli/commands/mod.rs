use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

use super::{Commands, PageArgs, VariableArgs};
use crate::engine::types::Variables;
use crate::engine::{Credential, EngineClient, Page, PageRequest};
use crate::lifecycle::LifecycleCoordinator;

pub mod decisions;
pub mod definitions;
pub mod deployments;
pub mod forms;
pub mod health;
pub mod instances;
pub mod tasks;
pub mod users;

/// Everything a command needs to talk to the engine.
pub struct CommandContext {
    pub client: EngineClient,
    pub credential: Credential,
}

impl CommandContext {
    pub fn new(client: EngineClient, credential: Credential) -> Self {
        Self { client, credential }
    }

    pub fn coordinator(&self) -> LifecycleCoordinator<EngineClient> {
        LifecycleCoordinator::new(self.client.clone())
    }
}

pub async fn execute(command: &Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Definitions(action) => definitions::execute(action, ctx).await,
        Commands::Deployments(action) => deployments::execute(action, ctx).await,
        Commands::Instances(action) => instances::execute(action, ctx).await,
        Commands::Tasks(action) => tasks::execute(action, ctx).await,
        Commands::Decisions(action) => decisions::execute(action, ctx).await,
        Commands::Forms(action) => forms::execute(action, ctx).await,
        Commands::Users(action) => users::execute(action, ctx).await,
        Commands::Health => health::execute(ctx).await,
    }
}

/// Resource name recorded on the command span.
pub fn operation_name(command: &Commands) -> &'static str {
    match command {
        Commands::Definitions(_) => "definitions",
        Commands::Deployments(_) => "deployments",
        Commands::Instances(_) => "instances",
        Commands::Tasks(_) => "tasks",
        Commands::Decisions(_) => "decisions",
        Commands::Forms(_) => "forms",
        Commands::Users(_) => "users",
        Commands::Health => "health",
    }
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        PageRequest::new(args.page, args.size)
    }
}

/// Collect variables from `--vars-file` then `--var name=value`, later ones winning.
pub fn parse_variables(args: &VariableArgs) -> Result<Variables> {
    let mut variables = match &args.vars_file {
        Some(path) => read_json_object(path)?,
        None => Variables::new(),
    };

    for raw in &args.vars {
        let Some((name, value)) = raw.split_once('=') else {
            bail!("Variable '{raw}' must look like name=value");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("Variable '{raw}' has an empty name");
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        variables.insert(name.to_string(), value);
    }

    Ok(variables)
}

pub fn read_json_object(path: &Path) -> Result<Variables> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))? {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print each row of a page followed by a position footer.
pub fn print_page<T>(page: &Page<T>, row: impl Fn(&T) -> String) {
    if page.is_empty() {
        println!("📋 Nothing found");
        return;
    }
    for item in &page.items {
        println!("{}", row(item));
    }
    match page.total {
        Some(total) => println!("page {}: {} of {total}", page.page, page.len()),
        None => println!("page {}: {} shown", page.page, page.len()),
    }
}

pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    #[test]
    fn test_inline_variables_parse_json_values() {
        let args = VariableArgs {
            vars: vec![
                "approved=true".to_string(),
                "amount=125.5".to_string(),
                "comment=looks fine".to_string(),
                "tags=[\"a\",\"b\"]".to_string(),
            ],
            vars_file: None,
        };
        let variables = parse_variables(&args).unwrap();
        assert_eq!(variables["approved"], json!(true));
        assert_eq!(variables["amount"], json!(125.5));
        assert_eq!(variables["comment"], json!("looks fine"));
        assert_eq!(variables["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_inline_variables_override_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"approved": false, "region": "eu"}"#).unwrap();
        let args = VariableArgs {
            vars: vec!["approved=true".to_string()],
            vars_file: Some(file.path().to_path_buf()),
        };
        let variables = parse_variables(&args).unwrap();
        assert_eq!(variables["approved"], json!(true));
        assert_eq!(variables["region"], json!("eu"));
    }

    #[test]
    fn test_malformed_variable_is_rejected() {
        let args = VariableArgs {
            vars: vec!["no-equals-sign".to_string()],
            vars_file: None,
        };
        assert!(parse_variables(&args).is_err());
    }

    #[test]
    fn test_variables_file_must_be_object() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[1, 2]").unwrap();
        assert!(read_json_object(file.path()).is_err());
    }
}
