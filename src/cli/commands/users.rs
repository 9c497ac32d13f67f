use anyhow::Result;

use super::{or_dash, print_json, print_page, CommandContext};
use crate::cli::UserAction;
use crate::engine::types::{NewUser, User, UserUpdate};

pub async fn execute(action: &UserAction, ctx: &CommandContext) -> Result<()> {
    let users = ctx.client.users();
    let credential = &ctx.credential;

    match action {
        UserAction::List { page, search } => {
            let result = users
                .list(credential, (*page).into(), search.as_deref())
                .await?;
            print_page(&result, row);
        }
        UserAction::Get { id } => print_json(&users.get(credential, id).await?)?,
        UserAction::Create {
            username,
            email,
            password,
            roles,
        } => {
            let user = NewUser {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
                roles: roles.clone(),
            };
            let created = users.create(credential, &user).await?;
            println!("👤 Created user {} ({})", created.username, created.id);
        }
        UserAction::Update {
            id,
            email,
            roles,
            status,
        } => {
            let update = UserUpdate {
                email: email.clone(),
                roles: (!roles.is_empty()).then(|| roles.clone()),
                status: status.clone(),
            };
            let updated = users.update(credential, id, &update).await?;
            println!("👤 Updated user {}", updated.username);
        }
        UserAction::Delete { id } => {
            users.delete(credential, id).await?;
            println!("🗑️  Deleted user {id}");
        }
    }
    Ok(())
}

fn row(user: &User) -> String {
    format!(
        "{:<36} {:<20} {:<30} {:<10} {}",
        user.id,
        user.username,
        or_dash(user.email.as_deref()),
        or_dash(user.status.as_deref()),
        user.roles.join(",")
    )
}
