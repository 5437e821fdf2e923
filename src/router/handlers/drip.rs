//! `/drip set | settings | 0xAddress $token`.

use super::reply;
use crate::chain::{lowercase_address, parse_address, parse_units};
use crate::queue::Job;
use crate::router::{messages, CommandContext, Outcome};
use crate::state::{DripDecision, Interval, Symbol};
use crate::types::{Error, Result};
use crate::validation::{self, Field};

pub async fn handle(ctx: &CommandContext<'_>, args: &[String]) -> Result<Outcome> {
    match args {
        [sub, token, amount, interval] if sub == "set" => set(ctx, token, amount, interval).await,
        [sub] if sub == "settings" => settings(ctx).await,
        [address, token] if validation::matches(Field::Address, address) => {
            request(ctx, address, token).await
        }
        _ => reply(messages::DRIP_USAGE),
    }
}

async fn set(ctx: &CommandContext<'_>, token: &str, amount: &str, interval: &str) -> Result<Outcome> {
    if !validation::all_match(&[
        (Field::Token, token),
        (Field::Amount, amount),
        (Field::Duration, interval),
    ]) {
        return reply(messages::DRIP_USAGE);
    }
    let chain = ctx.chain()?;
    let symbol = Symbol::parse(token)?;
    let Ok(interval) = Interval::parse(interval) else {
        return reply(messages::DRIP_USAGE);
    };

    match ctx
        .repo
        .set_drip(chain, symbol.clone(), amount.to_string(), interval)
        .await
    {
        Ok(()) => {}
        Err(Error::NotFound(_)) => return reply(messages::unknown_token(&symbol.display())),
        Err(e) => return Err(e),
    }
    tracing::info!(symbol = %symbol, quantity = amount, %interval, "drip configured");
    reply(format!(
        "Drip for `{}` set to `{}` every `{}`.",
        symbol.display(),
        amount,
        interval
    ))
}

async fn settings(ctx: &CommandContext<'_>) -> Result<Outcome> {
    let settings = ctx.repo.drip_settings().await?;
    if settings.is_empty() {
        return reply("No drips are configured.");
    }
    reply(messages::block(
        "Drip settings:",
        settings.iter().map(|(symbol, setting)| {
            format!(
                "{}:\n{} every {}",
                symbol.display(),
                setting.quantity,
                setting.interval
            )
        }),
    ))
}

async fn request(ctx: &CommandContext<'_>, address: &str, token: &str) -> Result<Outcome> {
    if !validation::matches(Field::Token, token) {
        return reply(messages::DRIP_USAGE);
    }
    let chain = ctx.chain()?;
    let symbol = Symbol::parse(token)?;

    let decimals = if chain.is_native(&symbol) {
        chain.decimals
    } else {
        match ctx.repo.tokens().await?.get(&symbol) {
            Some(entry) => entry.decimals,
            None => return reply(messages::unknown_token(&symbol.display())),
        }
    };
    let settings = ctx.repo.drip_settings().await?;
    let Some(setting) = settings.get(&symbol) else {
        return reply(format!("No drip is configured for `{}`.", symbol.display()));
    };
    if parse_units(&setting.quantity, decimals).is_err() {
        return reply(format!(
            "Drip amount `{}` is not valid for `{}` ({} decimals).",
            setting.quantity,
            symbol.display(),
            decimals
        ));
    }

    let destination = parse_address(address)?;
    let decision = ctx
        .repo
        .check_drip(
            &ctx.caller.username.handle(),
            &lowercase_address(&destination),
            &symbol,
            &setting.interval,
            ctx.clock.now_millis(),
        )
        .await?;

    match decision {
        DripDecision::Approved(marks) => {
            let job = Job {
                chat_id: ctx.chat_id,
                address: destination,
                amount: setting.quantity.clone(),
                token: symbol,
            };
            tracing::info!(chat_id = ctx.chat_id, token = %job.token, "queueing drip");
            Ok(Outcome::Enqueue {
                job,
                marks: Some(marks),
            })
        }
        DripDecision::Limited { wait_millis } => {
            let minutes = wait_millis.div_ceil(60_000).max(1);
            reply(format!(
                "Drip limit reached for `{}`. Try again in {} minute{}.",
                symbol.display(),
                minutes,
                if minutes == 1 { "" } else { "s" }
            ))
        }
    }
}
