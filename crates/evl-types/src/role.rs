use std::fmt;

use serde::{Deserialize, Serialize};

/// Protocol roles gating privileged operations.
///
/// The minting gate and the recipient whitelist are independent: `Minter`
/// controls who may increase supply, `Operator` is the protocol-level
/// bypass of the per-holder approval requirement on transfer
/// destinations. `Admin` administers grants of the other two (and of
/// itself).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Minter,
    Operator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Minter => "minter",
            Role::Operator => "operator",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Minter.to_string(), "minter");
        assert_eq!(Role::Operator.to_string(), "operator");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&Role::Minter).unwrap();
        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Role::Minter);
    }
}
