//! Execute message handlers.
//!
//! - `router` - protocol-selected outbound bridging
//! - `ledger` - module-facing admission, burn, fee collection and mint
//! - `registry` - protocol registration, destinations and health checks
//! - `security` - limits, pauses, blocks and suspicious-activity management
//! - `fees` - fee estimation, policies and gas price samples
//! - `admin` - roles and admin transfer

mod admin;
mod fees;
mod ledger;
mod registry;
mod router;
mod security;

pub use admin::*;
pub use fees::*;
pub use ledger::*;
pub use registry::*;
pub use router::*;
pub use security::*;

use cosmwasm_std::Binary;

use crate::error::ContractError;

pub(crate) fn parse_transfer_id(id: &Binary) -> Result<[u8; 32], ContractError> {
    id.as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidTransferId { len: id.len() })
}
