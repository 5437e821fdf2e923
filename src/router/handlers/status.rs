//! `/status [$token]`: faucet address and balance.

use super::reply;
use crate::chain::{format_units, parse_address, Address, Signer, U256};
use crate::router::{messages, CommandContext, Outcome};
use crate::state::Symbol;
use crate::types::Result;
use crate::validation::{self, Field};

pub async fn handle(ctx: &CommandContext<'_>, args: &[String]) -> Result<Outcome> {
    let chain = ctx.chain()?;
    let symbol = match args {
        [] => chain.native_token.clone(),
        [token] if validation::matches(Field::Token, token) => Symbol::parse(token)?,
        _ => return reply(messages::STATUS_USAGE),
    };
    let faucet = Signer::from_hex(&chain.signing_key)?.address();

    if chain.is_native(&symbol) {
        let balance = match read_balance(ctx, &chain.rpc_url, None, faucet).await {
            Some(balance) => balance,
            None => return reply(messages::RPC_UNREACHABLE),
        };
        return reply(messages::block(
            "Faucet status:",
            [
                format!("Faucet Address:\n{}", faucet),
                format!(
                    "Balance:\n{} {}",
                    format_units(balance, chain.decimals),
                    symbol.display()
                ),
            ],
        ));
    }

    let tokens = ctx.repo.tokens().await?;
    let Some(entry) = tokens.get(&symbol) else {
        return reply(messages::unknown_token(&symbol.display()));
    };
    let Ok(token_address) = parse_address(&entry.address) else {
        return reply(messages::unknown_token(&symbol.display()));
    };
    let balance = match read_balance(ctx, &chain.rpc_url, Some(token_address), faucet).await {
        Some(balance) => balance,
        None => return reply(messages::RPC_UNREACHABLE),
    };
    reply(messages::block(
        &format!("Faucet `{}` status:", symbol.display()),
        [
            format!("Faucet Address:\n{}", faucet),
            format!(
                "Balance:\n{} {}\n({})",
                format_units(balance, entry.decimals),
                symbol.display(),
                entry.address
            ),
        ],
    ))
}

/// Native balance when `token` is `None`. RPC failures are logged and read
/// as `None`.
async fn read_balance(
    ctx: &CommandContext<'_>,
    rpc_url: &str,
    token: Option<Address>,
    owner: Address,
) -> Option<U256> {
    let result = match ctx.connector.connect(rpc_url) {
        Ok(client) => match token {
            None => client.native_balance(owner).await,
            Some(token) => client.token_balance(token, owner).await,
        },
        Err(e) => Err(e),
    };
    result
        .map_err(|e| tracing::warn!(rpc_url, error = %e, "balance read failed"))
        .ok()
}
