use anyhow::{bail, Result};

use super::CommandContext;

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let health = ctx.client.system().health(&ctx.credential).await?;
    if health.is_up() {
        println!("✅ Engine at {} is {}", ctx.client.transport().base_url(), health.status);
        Ok(())
    } else {
        bail!("engine reports status {}", health.status)
    }
}
