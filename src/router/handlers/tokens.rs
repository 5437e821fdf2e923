//! `/tokens [add $token 0xAddress [decimals] | remove $token]`.

use super::reply;
use crate::router::{messages, CommandContext, Outcome};
use crate::state::{Symbol, TokenEntry, DEFAULT_TOKEN_DECIMALS, MAX_DECIMALS};
use crate::types::{Error, Result};
use crate::validation::{self, Field};

pub async fn handle(ctx: &CommandContext<'_>, args: &[String]) -> Result<Outcome> {
    match args.split_first() {
        None => list(ctx).await,
        Some((sub, rest)) if sub == "add" => add(ctx, rest).await,
        Some((sub, rest)) if sub == "remove" => remove(ctx, rest).await,
        Some(_) => reply(messages::TOKENS_USAGE),
    }
}

async fn list(ctx: &CommandContext<'_>) -> Result<Outcome> {
    let listing = ctx.repo.list_tokens(ctx.chain()?).await?;
    reply(messages::block(
        "Tokens are:",
        listing.into_iter().map(|row| {
            format!(
                "{}:\n{}\nDecimals: {}",
                row.symbol.display(),
                row.address,
                row.decimals
            )
        }),
    ))
}

async fn add(ctx: &CommandContext<'_>, rest: &[String]) -> Result<Outcome> {
    let (token, address, decimals) = match rest {
        [token, address] => (token, address, None),
        [token, address, decimals] => (token, address, Some(decimals)),
        _ => return reply(messages::TOKENS_USAGE),
    };
    if !validation::matches(Field::Token, token) || !validation::matches(Field::Address, address) {
        return reply(messages::TOKENS_USAGE);
    }
    let decimals = match decimals {
        None => DEFAULT_TOKEN_DECIMALS,
        Some(text) if validation::matches(Field::NonNegativeInteger, text) => {
            match text.parse::<u8>().ok().filter(|d| *d <= MAX_DECIMALS) {
                Some(decimals) => decimals,
                None => return reply(messages::TOKENS_USAGE),
            }
        }
        Some(_) => return reply(messages::TOKENS_USAGE),
    };

    let symbol = Symbol::parse(token)?;
    let entry = TokenEntry {
        address: address.clone(),
        decimals,
    };
    match ctx.repo.add_token(ctx.chain()?, symbol.clone(), entry).await {
        Ok(()) => {}
        Err(Error::Validation(_)) => {
            return reply(format!(
                "`{}` is the native token and cannot be added.",
                symbol.display()
            ));
        }
        Err(e) => return Err(e),
    }
    tracing::info!(symbol = %symbol, address = %address, decimals, "token registered");
    reply(format!(
        "Token `{}` successfully added as:\n```\n{}\n```\nDecimals: {}",
        symbol.display(),
        address,
        decimals
    ))
}

async fn remove(ctx: &CommandContext<'_>, rest: &[String]) -> Result<Outcome> {
    let [token] = rest else {
        return reply(messages::TOKENS_USAGE);
    };
    if !validation::matches(Field::Token, token) {
        return reply(messages::TOKENS_USAGE);
    }
    let symbol = Symbol::parse(token)?;
    if !ctx.repo.remove_token(&symbol).await? {
        return Ok(Outcome::Silent);
    }
    tracing::info!(symbol = %symbol, "token removed");
    reply(format!(
        "Token `{}` successfully removed from tokens.",
        symbol.display()
    ))
}
