//! Per-command access policy.
//!
//! Callers never learn why a command was refused: every authorization
//! denial is silent, including admins on a faucet that is not yet
//! operational. Only a repeated `/start` answers visibly.

use super::command::Command;
use super::messages;
use crate::state::Authorization;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Refuse with a message.
    DenyVisible(String),
    /// Refuse without replying.
    DenySilent,
}

/// What a command needs from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    Anyone,
    Uninitialized,
    SuperAdmin,
    Admin,
    AdminWithSuperAdmin,
    Operational,
    AdminOperational,
}

fn requirement(command: Command, subcommand: Option<&str>) -> Requirement {
    match (command, subcommand) {
        (Command::Start, _) => Requirement::Uninitialized,
        (Command::Help, _) => Requirement::Anyone,
        (Command::SuperAdmin, Some("set")) => Requirement::SuperAdmin,
        (Command::SuperAdmin, _) => Requirement::Admin,
        (Command::Rpc, Some("set")) => Requirement::Admin,
        (Command::Rpc, _) => Requirement::Operational,
        (Command::Admin, Some("check")) => Requirement::AdminWithSuperAdmin,
        (Command::Admin, _) => Requirement::AdminOperational,
        (Command::Status, _) => Requirement::Operational,
        (Command::Tokens, Some("add" | "remove")) => Requirement::AdminOperational,
        (Command::Tokens, _) => Requirement::Operational,
        (Command::Send, _) => Requirement::AdminOperational,
        (Command::Drip, Some("set")) => Requirement::AdminOperational,
        (Command::Drip, _) => Requirement::Operational,
    }
}

/// Decide whether `auth` may run `command` with `args`.
pub fn access(command: Command, args: &[String], auth: &Authorization) -> Access {
    let subcommand = args.first().map(String::as_str);
    let allowed = match requirement(command, subcommand) {
        Requirement::Anyone => true,
        Requirement::Uninitialized => {
            if auth.has_super_admin {
                return Access::DenyVisible(messages::ALREADY_INITIALIZED.to_string());
            }
            true
        }
        Requirement::SuperAdmin => auth.is_super_admin,
        Requirement::Admin => auth.is_admin,
        Requirement::AdminWithSuperAdmin => auth.is_admin && auth.has_super_admin,
        Requirement::Operational => auth.is_operational,
        Requirement::AdminOperational => auth.is_admin && auth.is_operational,
    };

    if allowed {
        Access::Allow
    } else {
        Access::DenySilent
    }
}
