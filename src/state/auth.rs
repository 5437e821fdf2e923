//! Caller authorization.

use super::records::ChainConfig;
use crate::types::Username;

/// What the caller may do, derived from stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Authorization {
    /// Caller is the stored superadmin.
    pub is_super_admin: bool,
    /// Caller is the superadmin or carries an admin flag.
    pub is_admin: bool,
    /// A superadmin exists and the chain config is complete.
    pub is_operational: bool,
    /// A superadmin exists.
    pub has_super_admin: bool,
}

impl Authorization {
    /// Combine the caller with the stored records.
    pub fn resolve(
        caller: &Username,
        super_admin: Option<&Username>,
        admin_flag: bool,
        chain: Option<&ChainConfig>,
    ) -> Self {
        let is_super_admin = super_admin == Some(caller);
        Self {
            is_super_admin,
            is_admin: is_super_admin || admin_flag,
            is_operational: super_admin.is_some() && chain.is_some(),
            has_super_admin: super_admin.is_some(),
        }
    }
}

/// Everything the router knows about the caller of one command.
#[derive(Debug, Clone)]
pub struct Caller {
    pub username: Username,
    pub auth: Authorization,
    pub super_admin: Option<Username>,
    pub chain: Option<ChainConfig>,
}
