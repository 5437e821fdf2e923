//! One handler per [`Command`].
//!
//! Handlers validate their arguments, read and write state, and return an
//! [`Outcome`]. Malformed arguments produce a usage reply and change nothing.

mod admin;
mod drip;
mod help;
mod rpc;
mod send;
mod start;
mod status;
mod superadmin;
mod tokens;

use super::{Command, CommandContext, Outcome};
use crate::types::Result;

pub async fn dispatch(command: Command, ctx: &CommandContext<'_>, args: &[String]) -> Result<Outcome> {
    match command {
        Command::Start => start::handle(ctx, args).await,
        Command::Help => help::handle(ctx, args).await,
        Command::SuperAdmin => superadmin::handle(ctx, args).await,
        Command::Rpc => rpc::handle(ctx, args).await,
        Command::Admin => admin::handle(ctx, args).await,
        Command::Status => status::handle(ctx, args).await,
        Command::Tokens => tokens::handle(ctx, args).await,
        Command::Send => send::handle(ctx, args).await,
        Command::Drip => drip::handle(ctx, args).await,
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

fn reply(text: impl Into<String>) -> Result<Outcome> {
    Ok(Outcome::Reply(text.into()))
}
