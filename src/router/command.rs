//! Command line tokenizing.

/// Every command the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Help,
    SuperAdmin,
    Rpc,
    Admin,
    Status,
    Tokens,
    Send,
    Drip,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "/start" => Command::Start,
            "/help" => Command::Help,
            "/superadmin" => Command::SuperAdmin,
            "/rpc" => Command::Rpc,
            "/admin" => Command::Admin,
            "/status" => Command::Status,
            "/tokens" => Command::Tokens,
            "/send" => Command::Send,
            "/drip" => Command::Drip,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::SuperAdmin => "superadmin",
            Command::Rpc => "rpc",
            Command::Admin => "admin",
            Command::Status => "status",
            Command::Tokens => "tokens",
            Command::Send => "send",
            Command::Drip => "drip",
        }
    }
}

/// Split `text` into a command and its positional arguments.
///
/// Returns `None` for anything that is not a known command. A `@botname`
/// suffix on the command (`/help@faucet_bot`) is ignored.
pub fn parse(text: &str) -> Option<(Command, Vec<String>)> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?;
    let name = head.split_once('@').map_or(head, |(name, _)| name);
    let command = Command::from_name(name)?;
    Some((command, tokens.map(str::to_string).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_arguments() {
        let (command, args) = parse("  /send   0xabc  1.5 $usdc ").unwrap();
        assert_eq!(command, Command::Send);
        assert_eq!(args, vec!["0xabc", "1.5", "$usdc"]);
    }

    #[test]
    fn test_strips_bot_suffix() {
        assert_eq!(parse("/help@faucet_bot").unwrap().0, Command::Help);
    }

    #[test]
    fn test_unknown_and_case_sensitive() {
        assert!(parse("/unknown").is_none());
        assert!(parse("/HELP").is_none());
        assert!(parse("help").is_none());
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
    }
}
