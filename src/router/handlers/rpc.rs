//! `/rpc [set ...]`: show or replace the chain config.

use super::reply;
use crate::chain::{Address, Signer};
use crate::router::{messages, CommandContext, Outcome};
use crate::state::{ChainConfig, Symbol, MAX_DECIMALS};
use crate::types::Result;
use crate::validation::{self, normalize_url, Field};

pub async fn handle(ctx: &CommandContext<'_>, args: &[String]) -> Result<Outcome> {
    match args.split_first() {
        Some((sub, values)) if sub == "set" => set(ctx, values).await,
        _ => view(ctx),
    }
}

/// Config lines with the signing key replaced by the faucet address.
fn describe(config: &ChainConfig, faucet: Address) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}\n{}",
        config.chain_id,
        config.chain_name,
        config.rpc_url,
        config.native_token.display(),
        config.decimals,
        config.block_explorer_url,
        faucet
    )
}

fn view(ctx: &CommandContext<'_>) -> Result<Outcome> {
    let chain = ctx.chain()?;
    let signer = Signer::from_hex(&chain.signing_key)?;
    reply(messages::block("RPC values are:", [describe(chain, signer.address())]))
}

fn invalid() -> Result<Outcome> {
    reply(format!("Invalid RPC values.\n{}", messages::RPC_USAGE))
}

async fn set(ctx: &CommandContext<'_>, values: &[String]) -> Result<Outcome> {
    let [chain_id, name, url, token, decimals, explorer, key] = values else {
        return invalid();
    };
    if !validation::all_match(&[
        (Field::PositiveInteger, chain_id.as_str()),
        (Field::ChainName, name.as_str()),
        (Field::Url, url.as_str()),
        (Field::Token, token.as_str()),
        (Field::NonNegativeInteger, decimals.as_str()),
        (Field::Url, explorer.as_str()),
        (Field::SigningKey, key.as_str()),
    ]) {
        return invalid();
    }
    let Ok(chain_id) = chain_id.parse::<u64>() else {
        return invalid();
    };
    let Some(decimals) = decimals.parse::<u8>().ok().filter(|d| *d <= MAX_DECIMALS) else {
        return invalid();
    };
    let Ok(signer) = Signer::from_hex(key) else {
        return invalid();
    };

    let config = ChainConfig {
        chain_id,
        chain_name: name.clone(),
        rpc_url: normalize_url(url),
        native_token: Symbol::parse(token)?,
        decimals,
        block_explorer_url: normalize_url(explorer),
        signing_key: key.clone(),
    };

    let reported = match ctx.connector.connect(&config.rpc_url) {
        Ok(client) => client.chain_id().await,
        Err(e) => Err(e),
    };
    match reported {
        Err(e) => {
            tracing::warn!(rpc_url = %config.rpc_url, error = %e, "rpc liveness check failed");
            return reply(format!("Could not reach the RPC.\n{}", messages::RPC_USAGE));
        }
        Ok(reported) if reported != chain_id => {
            tracing::warn!(expected = chain_id, reported, "rpc chain id mismatch");
            return reply(format!(
                "Invalid chain id: the RPC reports `{}`, not `{}`.\n{}",
                reported,
                chain_id,
                messages::RPC_USAGE
            ));
        }
        Ok(_) => {}
    }

    ctx.repo.set_chain_config(&config).await?;
    tracing::info!(chain_id, chain_name = %config.chain_name, "chain config replaced");
    reply(messages::block(
        "RPC set successfully.",
        [describe(&config, signer.address())],
    ))
}
