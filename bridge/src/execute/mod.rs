//! Execute message handlers.
//!
//! - `outgoing` - burn, charge and dispatch
//! - `incoming` - authenticated deliveries, mint settlement, remediation
//! - `config` - destinations, fees, access lists, backend, pause
//! - `admin` - admin transfer

mod admin;
mod config;
mod incoming;
mod outgoing;

pub use admin::*;
pub use config::*;
pub use incoming::*;
pub use outgoing::*;

/// `0x`-prefixed hex for ids and hashes in attributes and errors
pub(crate) fn id_hex(id: &[u8]) -> String {
    format!("0x{}", hex::encode(id))
}
