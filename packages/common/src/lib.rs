//! Common - Shared Types and Utilities for Omnibridge Contracts
//!
//! This package provides the interface shared by the gateway contract and the
//! per-protocol bridge modules:
//!
//! - [`Protocol`] tags identifying each messaging backend
//! - the gateway's module-facing messages (admission, burn, fee collection, mint)
//! - the module-facing messages the router dispatches (initiate transfer, quote fee)
//! - transfer id hashing

pub mod gateway;
pub mod hash;
pub mod module;
pub mod protocol;

pub use hash::{bytes32_to_hex, compute_transfer_id, hex_to_bytes32, keccak256};
pub use protocol::Protocol;
