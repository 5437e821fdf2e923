//! `/send 0xAddress amount [$token]`: queue a transfer.

use super::reply;
use crate::chain::{parse_address, parse_units};
use crate::queue::Job;
use crate::router::{messages, CommandContext, Outcome};
use crate::state::Symbol;
use crate::types::Result;
use crate::validation::{self, Field};

pub async fn handle(ctx: &CommandContext<'_>, args: &[String]) -> Result<Outcome> {
    let chain = ctx.chain()?;
    let (address, amount, token) = match args {
        [address, amount] => (address, amount, None),
        [address, amount, token] => (address, amount, Some(token)),
        _ => return reply(messages::SEND_USAGE),
    };
    if !validation::matches(Field::Address, address) || !validation::matches(Field::Amount, amount) {
        return reply(messages::SEND_USAGE);
    }
    let symbol = match token {
        None => chain.native_token.clone(),
        Some(token) if validation::matches(Field::Token, token) => Symbol::parse(token)?,
        Some(_) => return reply(messages::SEND_USAGE),
    };

    let decimals = if chain.is_native(&symbol) {
        chain.decimals
    } else {
        match ctx.repo.tokens().await?.get(&symbol) {
            Some(entry) => entry.decimals,
            None => return reply(messages::unknown_token(&symbol.display())),
        }
    };
    if parse_units(amount, decimals).is_err() {
        return reply(format!(
            "Amount `{}` is not valid for `{}` ({} decimals).",
            amount,
            symbol.display(),
            decimals
        ));
    }

    let job = Job {
        chat_id: ctx.chat_id,
        address: parse_address(address)?,
        amount: amount.clone(),
        token: symbol,
    };
    tracing::info!(chat_id = ctx.chat_id, token = %job.token, "queueing send");
    Ok(Outcome::Enqueue { job, marks: None })
}
