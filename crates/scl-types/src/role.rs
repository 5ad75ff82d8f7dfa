use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A capability a supply-chain account either holds or does not hold.
///
/// Roles are independent permissions, not a hierarchy: an account may hold
/// zero, one, or several at once. `Admin` doubles as the administrative
/// capability over the registry itself: only admins may grant or revoke
/// roles (including `Admin`, which is how control is handed over).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May mint new batches.
    Manufacturer,
    /// May receive batches from manufacturers and pass them to retailers.
    Distributor,
    /// May receive batches from distributors and sell them onward.
    Retailer,
    /// May recall batches, pause the ledger, migrate storage, and manage roles.
    Admin,
    /// Read-only audit capability; holds no custody privileges.
    Inspector,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 5] = [
        Role::Manufacturer,
        Role::Distributor,
        Role::Retailer,
        Role::Admin,
        Role::Inspector,
    ];

    /// Stable string label used in logs and serialized grant records.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Manufacturer => "manufacturer",
            Role::Distributor => "distributor",
            Role::Retailer => "retailer",
            Role::Admin => "admin",
            Role::Inspector => "inspector",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manufacturer" => Ok(Role::Manufacturer),
            "distributor" => Ok(Role::Distributor),
            "retailer" => Ok(Role::Retailer),
            "admin" => Ok(Role::Admin),
            "inspector" => Ok(Role::Inspector),
            other => Err(TypeError::UnknownRole(other.to_string())),
        }
    }
}
