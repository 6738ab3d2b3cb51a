use serde::{Deserialize, Serialize};

/// Token configuration, fixed at construction.
///
/// The expiration period is shared by every asset class and is not
/// mutable after the token is initialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Human-readable token name.
    pub name: String,
    /// Short ticker symbol.
    pub symbol: String,
    /// Metadata URI (carried, not served).
    pub uri: String,
    /// Days a class stays live after its mint day. Value minted on day
    /// `D` is live through day `D + expiration_period_days` and expired
    /// from the day after.
    pub expiration_period_days: u64,
}

impl TokenConfig {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        uri: impl Into<String>,
        expiration_period_days: u64,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            uri: uri.into(),
            expiration_period_days,
        }
    }
}
