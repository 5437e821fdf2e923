//! `/start`: the first caller becomes superadmin.

use super::reply;
use crate::router::{CommandContext, Outcome};
use crate::types::Result;

pub async fn handle(ctx: &CommandContext<'_>, _args: &[String]) -> Result<Outcome> {
    let username = &ctx.caller.username;
    ctx.repo.set_super_admin(username).await?;
    tracing::info!(superadmin = %username, "faucet initialized");
    reply(format!("Superadmin `{}` has been set.", username))
}
