use super::reply;
use crate::router::{messages, CommandContext, Outcome};
use crate::types::Result;

pub async fn handle(_ctx: &CommandContext<'_>, _args: &[String]) -> Result<Outcome> {
    reply(messages::HELP)
}
