//! Chat reply texts (Markdown).

pub const ALREADY_INITIALIZED: &str = "Faucet is already initialized.";

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

pub const RPC_UNREACHABLE: &str = "Could not reach the RPC. Please try again later.";

pub const QUEUE_FAILURE: &str = "Transaction could not be queued. Please try again.";

pub const HELP: &str = "Available commands:\n\
```\n\
/start\n\
/superadmin [set @username]\n\
/rpc [set <chainId> <name> <url> <$token> <decimals> <explorerUrl> <key>]\n\
/admin add|remove|check @username\n\
/status [$token]\n\
/tokens [add $token 0xAddress [decimals] | remove $token]\n\
/send 0xAddress amount [$token]\n\
/drip set $token amount 30m|1h\n\
/drip settings\n\
/drip 0xAddress $token\n\
/help\n\
```\n\
`/start` makes the first caller superadmin. Transfers use the native token unless a registered `$token` is given.";

pub const SUPERADMIN_USAGE: &str = "Invalid superadmin values.\n```bash\n# Example:\n/superadmin set @username\n```";

pub const RPC_USAGE: &str = "```bash\n# Example:\n/rpc set 1 mainnet https://rpc.example.com $eth 18 https://explorer.example.com 0x<64 hex digit key>\n```";

pub const ADMIN_USAGE: &str = "Invalid admin values.\n```bash\n# Example:\n/admin add @username\n/admin remove @username\n/admin check @username\n```";

pub const STATUS_USAGE: &str = "Invalid status values.\n```bash\n# Example:\n/status\n/status $usdc\n```";

pub const TOKENS_USAGE: &str = "Invalid token values.\n```bash\n# Example:\n/tokens add $usdc 0x1111111111111111111111111111111111111111 6\n/tokens remove $usdc\n```";

pub const SEND_USAGE: &str = "Invalid send values.\n```bash\n# Example:\n/send 0x1111111111111111111111111111111111111111 0.5\n/send 0x1111111111111111111111111111111111111111 10 $usdc\n```";

pub const DRIP_USAGE: &str = "Invalid drip values.\n```bash\n# Example:\n/drip set $usdc 5 1h\n/drip settings\n/drip 0x1111111111111111111111111111111111111111 $usdc\n```";

/// Reply for a token symbol that is neither native nor registered.
pub fn unknown_token(symbol: &str) -> String {
    format!("Token `{}` is not registered.", symbol)
}

/// Code block with one entry per paragraph.
pub fn block<I: IntoIterator<Item = String>>(title: &str, entries: I) -> String {
    let body: Vec<String> = entries.into_iter().collect();
    format!("{}\n```\n{}\n```", title, body.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_mentions_every_command() {
        for name in ["/start", "/superadmin", "/rpc", "/admin", "/status", "/tokens", "/send", "/drip", "/help"] {
            assert!(HELP.contains(name), "{} missing", name);
        }
    }

    #[test]
    fn test_block() {
        let text = block("Tokens are:", vec!["A:\n1".to_string(), "B:\n2".to_string()]);
        assert_eq!(text, "Tokens are:\n```\nA:\n1\n\nB:\n2\n```");
    }
}
