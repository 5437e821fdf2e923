//! `/admin add|remove|check @username`.

use super::reply;
use crate::router::{messages, CommandContext, Outcome};
use crate::types::{Result, Username};
use crate::validation::{self, Field};

pub async fn handle(ctx: &CommandContext<'_>, args: &[String]) -> Result<Outcome> {
    let [action, target] = args else {
        return reply(messages::ADMIN_USAGE);
    };
    if !validation::matches(Field::Username, target) {
        return reply(messages::ADMIN_USAGE);
    }
    let Ok(user) = Username::from_handle(target) else {
        return reply(messages::ADMIN_USAGE);
    };
    let is_super_admin = ctx.caller.super_admin.as_ref() == Some(&user);

    match action.as_str() {
        "add" => {
            ctx.repo.set_admin_flag(&user).await?;
            tracing::info!(by = %ctx.caller.username, admin = %user, "admin added");
            reply(format!("Admin `{}` has been added.", user.handle()))
        }
        "remove" if is_super_admin => reply(format!(
            "`{}` is the superadmin and is always an admin.",
            user.handle()
        )),
        "remove" => {
            ctx.repo.remove_admin_flag(&user).await?;
            tracing::info!(by = %ctx.caller.username, admin = %user, "admin removed");
            reply(format!("Admin `{}` has been removed.", user.handle()))
        }
        "check" => {
            let is_admin = is_super_admin || ctx.repo.is_admin_flag(&user).await?;
            let verdict = if is_admin { "an" } else { "not an" };
            reply(format!("User `{}` is {} admin.", user.handle(), verdict))
        }
        _ => reply(messages::ADMIN_USAGE),
    }
}
