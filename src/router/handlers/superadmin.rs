//! `/superadmin [set @username]`.

use super::reply;
use crate::router::{messages, CommandContext, Outcome};
use crate::types::{Result, Username};
use crate::validation::{self, Field};

pub async fn handle(ctx: &CommandContext<'_>, args: &[String]) -> Result<Outcome> {
    match args {
        [] => match &ctx.caller.super_admin {
            Some(current) => reply(format!("Superadmin is `{}`.", current)),
            None => Ok(Outcome::Silent),
        },
        [sub, target] if sub == "set" && validation::matches(Field::Username, target) => {
            let Ok(next) = Username::from_handle(target) else {
                return reply(messages::SUPERADMIN_USAGE);
            };
            ctx.repo.set_super_admin(&next).await?;
            tracing::info!(from = %ctx.caller.username, to = %next, "superadmin transferred");
            reply(format!("Superadmin `{}` has been set.", next))
        }
        _ => reply(messages::SUPERADMIN_USAGE),
    }
}
