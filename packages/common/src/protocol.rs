//! Messaging protocol tags.

use std::fmt;

use cosmwasm_schema::cw_serde;

/// A cross-chain messaging backend a bridge module can be built on.
#[cw_serde]
#[derive(Copy, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    LayerZero,
    Wormhole,
    Hyperlane,
    Axelar,
    ValidatorSet,
}

impl Protocol {
    pub const ALL: [Protocol; 5] = [
        Protocol::LayerZero,
        Protocol::Wormhole,
        Protocol::Hyperlane,
        Protocol::Axelar,
        Protocol::ValidatorSet,
    ];

    /// Storage key and event attribute value. Matches the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::LayerZero => "layer_zero",
            Protocol::Wormhole => "wormhole",
            Protocol::Hyperlane => "hyperlane",
            Protocol::Axelar => "axelar",
            Protocol::ValidatorSet => "validator_set",
        }
    }

    pub fn from_key(key: &str) -> Option<Protocol> {
        Protocol::ALL.into_iter().find(|p| p.as_str() == key)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
